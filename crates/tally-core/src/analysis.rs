//! Analysis wrapper around the metrics engine
//!
//! [`Analyzer`] asks the configured enrichment backend for a report and falls
//! back to the local engine whenever the backend is missing, fails, or returns
//! a report whose category breakdown does not add up. Callers always get a
//! [`FinancialAnalysis`]; backend failures are logged, never surfaced.
//!
//! [`AnalysisCoordinator`] tracks which analysis is current when several are
//! requested in quick succession. Only the most recently requested one is
//! published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::{AIBackend, AIClient, AnalysisRequest};
use crate::metrics::{compute_metrics_for_period, FinancialMetrics, Period};
use crate::models::Transaction;

/// Where a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Enriched,
    LocalFallback,
}

impl AnalysisSource {
    /// Trust level attached to reports from this source
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Enriched => 0.95,
            Self::LocalFallback => 0.8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enriched => "enriched",
            Self::LocalFallback => "local_fallback",
        }
    }
}

impl std::fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Wall time spent producing the report, e.g. `12ms`
    pub processing_time: String,
    /// Day the analysis ran, `YYYY-MM-DD`
    pub analysis_date: String,
    pub transactions_analyzed: usize,
    pub source: AnalysisSource,
}

/// A metrics report with its confidence and provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysis {
    pub result: FinancialMetrics,
    pub confidence: f64,
    pub metadata: AnalysisMetadata,
}

/// Produces analyses, preferring the enrichment backend when one is set
#[derive(Clone, Default)]
pub struct Analyzer {
    backend: Option<AIClient>,
}

impl Analyzer {
    pub fn new(backend: Option<AIClient>) -> Self {
        Self { backend }
    }

    /// Analyzer that only uses the local engine
    pub fn local() -> Self {
        Self { backend: None }
    }

    pub fn backend(&self) -> Option<&AIClient> {
        self.backend.as_ref()
    }

    /// Analyze the collection for the current month
    pub async fn analyze(&self, transactions: &[Transaction], budget: f64) -> FinancialAnalysis {
        self.analyze_for_period(transactions, budget, Period::current())
            .await
    }

    /// Analyze the collection, labelling the report with `period`
    pub async fn analyze_for_period(
        &self,
        transactions: &[Transaction],
        budget: f64,
        period: Period,
    ) -> FinancialAnalysis {
        let started = Instant::now();
        let request = AnalysisRequest {
            transactions,
            budget,
            period,
        };

        let (result, source) = match self.enrich(&request).await {
            Some(metrics) => (metrics, AnalysisSource::Enriched),
            None => (
                compute_metrics_for_period(transactions, budget, period),
                AnalysisSource::LocalFallback,
            ),
        };

        let elapsed = started.elapsed();
        debug!(source = %source, elapsed_ms = elapsed.as_millis() as u64, "Analysis complete");

        FinancialAnalysis {
            result,
            confidence: source.confidence(),
            metadata: AnalysisMetadata {
                processing_time: format!("{}ms", elapsed.as_millis()),
                analysis_date: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
                transactions_analyzed: transactions.len(),
                source,
            },
        }
    }

    /// Ask the backend for a report, `None` when the local engine should be used
    async fn enrich(&self, request: &AnalysisRequest<'_>) -> Option<FinancialMetrics> {
        let backend = self.backend.as_ref()?;

        match backend.analyze_finances(request).await {
            Ok(metrics) if metrics.breakdown_is_consistent() => Some(metrics),
            Ok(metrics) => {
                warn!(
                    model = backend.model(),
                    total_expenses = metrics.summary.total_expenses,
                    "Enriched report breakdown does not match expenses, using local analysis"
                );
                None
            }
            Err(e) => {
                warn!(
                    model = backend.model(),
                    host = backend.host(),
                    error = %e,
                    "Enrichment failed, using local analysis"
                );
                None
            }
        }
    }
}

/// Publishes only the most recently requested analysis
///
/// Each call to [`begin`](Self::begin) supersedes every earlier one. A result
/// published under a superseded generation is dropped.
#[derive(Default)]
pub struct AnalysisCoordinator {
    analyzer: Analyzer,
    generation: AtomicU64,
    latest: RwLock<Option<FinancialAnalysis>>,
}

impl AnalysisCoordinator {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            generation: AtomicU64::new(0),
            latest: RwLock::new(None),
        }
    }

    /// Start a new generation, superseding any in flight
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Store an analysis if its generation is still the latest
    ///
    /// Returns whether it was published.
    pub fn publish(&self, generation: u64, analysis: Option<FinancialAnalysis>) -> bool {
        let Ok(mut latest) = self.latest.write() else {
            warn!("Analysis lock poisoned, result not published");
            return false;
        };
        // Checked under the lock so a newer result cannot be overwritten
        if !self.is_current(generation) {
            debug!(generation, "Dropping stale analysis");
            return false;
        }
        *latest = analysis;
        true
    }

    /// Run an analysis and publish it unless a newer one was requested meanwhile
    ///
    /// An empty collection clears the published analysis. Returns the analysis
    /// when it was published.
    pub async fn refresh(&self, transactions: &[Transaction], budget: f64) -> Option<FinancialAnalysis> {
        let generation = self.begin();

        if transactions.is_empty() {
            self.publish(generation, None);
            return None;
        }

        let analysis = self.analyzer.analyze(transactions, budget).await;
        if self.publish(generation, Some(analysis.clone())) {
            info!(
                generation,
                source = %analysis.metadata.source,
                "Published analysis"
            );
            Some(analysis)
        } else {
            None
        }
    }

    /// The currently published analysis
    pub fn latest(&self) -> Option<FinancialAnalysis> {
        self.latest.read().ok().and_then(|latest| latest.clone())
    }
}
