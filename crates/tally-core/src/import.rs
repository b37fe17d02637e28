//! Transaction import from JSON and CSV files
//!
//! A file that cannot be read as its format at all (invalid JSON, a JSON
//! value that is not an array, a CSV without the expected header) rejects the
//! whole import. Individual malformed records are skipped and counted.

use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{iso_date, parse_iso_date, Category, IdGenerator, Transaction, TransactionType};

/// CSV header used for both import and export
pub const CSV_HEADER: [&str; 5] = ["Date", "Type", "Category", "Amount", "Notes"];

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Guess the format from file content
    pub fn sniff(content: &str) -> Self {
        match strip_bom(content).trim_start().chars().next() {
            Some('[') | Some('{') => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown file format: {} (expected json or csv)", s)),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Records parsed from an import file
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub transactions: Vec<Transaction>,
    /// Records that were present but malformed
    pub skipped: usize,
}

/// Drop a leading UTF-8 byte order mark, as written by spreadsheet exports
fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Parse import file content
pub fn parse_import(content: &str, format: FileFormat, ids: &mut IdGenerator) -> Result<ImportOutcome> {
    let outcome = match format {
        FileFormat::Json => parse_json(content, ids)?,
        FileFormat::Csv => parse_csv(content, ids)?,
    };
    debug!(
        format = %format,
        parsed = outcome.transactions.len(),
        skipped = outcome.skipped,
        "Parsed import file"
    );
    Ok(outcome)
}

/// A transaction as it appears in an import file
///
/// Ids are optional so hand-written files can omit them.
#[derive(Debug, Deserialize)]
struct ImportedTransaction {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: TransactionType,
    category: String,
    amount: f64,
    #[serde(with = "iso_date")]
    date: NaiveDate,
    #[serde(default)]
    notes: Option<String>,
}

/// Parse a JSON array of transactions
pub fn parse_json(content: &str, ids: &mut IdGenerator) -> Result<ImportOutcome> {
    let value: Value = serde_json::from_str(strip_bom(content))
        .map_err(|e| Error::Import(format!("Invalid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(Error::Import("Expected a JSON array of transactions".into()));
    };

    let mut outcome = ImportOutcome::default();
    for (index, item) in items.into_iter().enumerate() {
        let record = serde_json::from_value::<ImportedTransaction>(item)
            .map_err(|e| Error::Import(e.to_string()))
            .and_then(|record| {
                build_transaction(
                    record.id,
                    record.kind,
                    &record.category,
                    record.amount,
                    record.date,
                    record.notes,
                    ids,
                )
            });

        match record {
            Ok(tx) => outcome.transactions.push(tx),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed JSON transaction");
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}

/// Parse CSV with header `Date,Type,Category,Amount,Notes`
///
/// The Notes column may be omitted.
pub fn parse_csv(content: &str, ids: &mut IdGenerator) -> Result<ImportOutcome> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(strip_bom(content).as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| Error::Import(format!("Unreadable CSV header: {}", e)))?
        .clone();
    check_header(&headers)?;

    let mut outcome = ImportOutcome::default();
    for (index, result) in rdr.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let parsed = result
            .map_err(|e| Error::Import(e.to_string()))
            .and_then(|record| parse_csv_row(&record, ids));

        match parsed {
            Ok(tx) => outcome.transactions.push(tx),
            Err(e) => {
                warn!(line, error = %e, "Skipping malformed CSV row");
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}

fn check_header(headers: &StringRecord) -> Result<()> {
    let expected = &CSV_HEADER[..4];
    let matches_expected = headers.len() >= expected.len()
        && expected
            .iter()
            .zip(headers.iter())
            .all(|(want, got)| want.eq_ignore_ascii_case(got));
    let notes_ok = headers
        .get(4)
        .map_or(true, |h| h.eq_ignore_ascii_case(CSV_HEADER[4]));

    if matches_expected && notes_ok {
        Ok(())
    } else {
        Err(Error::Import(format!(
            "Unexpected CSV header '{}' (expected {})",
            headers.iter().collect::<Vec<_>>().join(","),
            CSV_HEADER.join(",")
        )))
    }
}

fn parse_csv_row(record: &StringRecord, ids: &mut IdGenerator) -> Result<Transaction> {
    let date = parse_date(required(record, 0, "date")?)?;
    let kind: TransactionType = required(record, 1, "type")?
        .parse()
        .map_err(Error::Import)?;
    let category = required(record, 2, "category")?;
    let amount = parse_amount(required(record, 3, "amount")?)?;
    let notes = record.get(4).map(str::to_string);

    build_transaction(None, kind, category, amount, date, notes, ids)
}

fn required<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str> {
    record
        .get(index)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import(format!("Missing {}", name)))
}

fn build_transaction(
    id: Option<String>,
    kind: TransactionType,
    category: &str,
    amount: f64,
    date: NaiveDate,
    notes: Option<String>,
    ids: &mut IdGenerator,
) -> Result<Transaction> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Import(format!("Amount must be positive, got {}", amount)));
    }
    if category.trim().is_empty() {
        return Err(Error::Import("Missing category".into()));
    }

    let normalized = Category::parse(category).unwrap_or_else(|| {
        debug!(category, "Unknown category mapped to Other");
        Category::Other
    });

    let id = id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ids.next_id());

    Ok(Transaction {
        id,
        kind,
        category: normalized.label().to_string(),
        amount,
        date,
        notes: notes.filter(|n| !n.trim().is_empty()),
    })
}

/// Parse a date string in the formats people commonly export
fn parse_date(s: &str) -> Result<NaiveDate> {
    if let Some(date) = parse_iso_date(s) {
        return Ok(date);
    }

    let formats = [
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
        .ok_or_else(|| Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and thousands separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned = s.trim().replace(['$', ',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}
