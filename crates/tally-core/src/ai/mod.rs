//! Pluggable enrichment backend
//!
//! An enrichment backend receives the transaction collection and budget as a
//! natural-language prompt and answers with a report in the
//! [`FinancialMetrics`] shape. Calls are best effort: the analysis wrapper
//! falls back to the local engine whenever a backend fails.
//!
//! # Architecture
//!
//! - `AIBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! See [`crate::config::AiConfig`]. Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, mock, none). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;
pub mod parsing;
pub mod prompt;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::AiConfig;
use crate::error::Result;
use crate::metrics::{FinancialMetrics, Period};
use crate::models::Transaction;

/// Everything a backend needs to produce a report
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub transactions: &'a [Transaction],
    pub budget: f64,
    pub period: Period,
}

/// Trait defining the interface for all enrichment backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Produce a financial report for the request
    async fn analyze_finances(&self, request: &AnalysisRequest<'_>) -> Result<FinancialMetrics>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from configuration
    ///
    /// Returns None when enrichment is disabled or the selected backend is
    /// missing required settings (e.g. no Ollama host).
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let backend = config.backend.to_lowercase();
        let timeout = Duration::from_secs(config.timeout_secs);

        match backend.as_str() {
            "ollama" => config
                .host
                .as_deref()
                .map(|host| AIClient::Ollama(OllamaBackend::with_timeout(host, &config.model, timeout))),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            "none" | "off" | "disabled" => None,
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI backend, falling back to ollama");
                config
                    .host
                    .as_deref()
                    .map(|host| AIClient::Ollama(OllamaBackend::with_timeout(host, &config.model, timeout)))
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AIBackend for AIClient {
    async fn analyze_finances(&self, request: &AnalysisRequest<'_>) -> Result<FinancialMetrics> {
        match self {
            AIClient::Ollama(b) => b.analyze_finances(request).await,
            AIClient::Mock(b) => b.analyze_finances(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
