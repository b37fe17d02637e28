//! Mock backend for testing
//!
//! Answers with the local engine's report, optionally after a delay, or fails
//! on demand. Useful for unit tests and development without a running LLM
//! server.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::metrics::{compute_metrics_for_period, FinancialMetrics};

use super::{AIBackend, AnalysisRequest};

#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether analyze_finances should return an error
    pub fail: bool,
    /// Simulated latency before answering
    pub delay: Option<Duration>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Self::default()
        }
    }

    /// Create a mock backend whose analysis calls always fail
    pub fn failing() -> Self {
        Self {
            healthy: false,
            fail: true,
            delay: None,
        }
    }

    /// Add simulated latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn analyze_finances(&self, request: &AnalysisRequest<'_>) -> Result<FinancialMetrics> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(Error::InvalidData("Mock backend configured to fail".into()));
        }

        Ok(compute_metrics_for_period(
            request.transactions,
            request.budget,
            request.period,
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
