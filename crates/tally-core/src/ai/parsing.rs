//! JSON parsing helpers for backend responses
//!
//! Models often wrap the JSON payload in prose or code fences, so the
//! outermost `{...}` span is extracted before deserializing.

use crate::error::{Error, Result};
use crate::metrics::FinancialMetrics;

/// Maximum number of characters of raw model output quoted in errors
const RAW_EXCERPT_LEN: usize = 200;

/// Parse a financial report from a model response
pub fn parse_metrics(response: &str) -> Result<FinancialMetrics> {
    let json_str = extract_json_object(response).ok_or_else(|| {
        Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            excerpt(response.trim())
        ))
    })?;

    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from AI: {} | Raw: {}",
            e,
            excerpt(json_str)
        ))
    })
}

/// Return the span from the first `{` to the last `}`, if any
pub fn extract_json_object(response: &str) -> Option<&str> {
    let response = response.trim();
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

fn excerpt(s: &str) -> String {
    if s.chars().count() > RAW_EXCERPT_LEN {
        let truncated: String = s.chars().take(RAW_EXCERPT_LEN).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{compute_metrics_for_period, Period};

    fn sample_json() -> String {
        let metrics = compute_metrics_for_period(&[], 500.0, Period::new(2024, 5).unwrap());
        serde_json::to_string(&metrics).unwrap()
    }

    #[test]
    fn test_parse_plain_json() {
        let metrics = parse_metrics(&sample_json()).unwrap();
        assert_eq!(metrics.budget_analysis.monthly_budget, 500.0);
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let response = format!("Here is the analysis:\n```json\n{}\n```\nLet me know!", sample_json());
        let metrics = parse_metrics(&response).unwrap();
        assert_eq!(metrics.summary.period, "2024-05");
    }

    #[test]
    fn test_no_json() {
        let err = parse_metrics("I cannot help with that.").unwrap_err();
        assert!(err.to_string().contains("No JSON found"));
    }

    #[test]
    fn test_wrong_shape() {
        let err = parse_metrics(r#"{"total": 12}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let long = "é".repeat(300);
        let short = excerpt(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), RAW_EXCERPT_LEN + 3);
    }
}
