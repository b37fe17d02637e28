//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Transaction and category models
//! - Financial metrics engine (totals, budget status, category breakdown)
//! - Analysis wrapper with a pluggable enrichment backend (Ollama)
//! - Key-value persistence and application state
//! - JSON and CSV import/export

pub mod ai;
pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod metrics;
pub mod models;
pub mod state;
pub mod store;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, AnalysisRequest, MockBackend, OllamaBackend};
pub use analysis::{AnalysisCoordinator, AnalysisMetadata, AnalysisSource, Analyzer, FinancialAnalysis};
pub use config::{AiConfig, Config};
pub use error::{Error, Result};
pub use export::default_export_filename;
pub use import::{FileFormat, ImportOutcome};
pub use metrics::{
    compute_metrics, compute_metrics_for_period, BudgetStatus, CategoryBreakdown, FinancialMetrics,
    Period,
};
pub use models::{Category, IdGenerator, Transaction, TransactionInput, TransactionType};
pub use state::{AppState, ImportStats, TransactionCounts};
pub use store::{FileStore, KeyValueStore, MemoryStore};
