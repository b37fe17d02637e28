//! Test utilities for tally-core
//!
//! This module provides a mock Ollama server that can be used for development
//! and integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A well-formed report for one income of 3000 and expenses of 400 (Food)
/// and 200 (Transport) against a budget of 1000
pub const SAMPLE_METRICS_RESPONSE: &str = r#"{
  "summary": {"total_income": 3000.0, "total_expenses": 600.0, "net_balance": 2400.0, "period": "2024-01"},
  "budget_analysis": {"monthly_budget": 1000.0, "spent": 600.0, "remaining": 400.0, "percentage_used": 60.0, "status": "On Track"},
  "category_breakdown": [
    {"category": "Food", "amount": 400.0, "percentage": 66.67},
    {"category": "Transport", "amount": 200.0, "percentage": 33.33}
  ],
  "chart_data": {
    "pie_chart": [{"category": "Food", "value": 400.0}, {"category": "Transport", "value": 200.0}],
    "bar_chart": [{"category": "Food", "amount": 400.0}, {"category": "Transport", "amount": 200.0}],
    "progress_bar": {"used": 600.0, "total": 1000.0, "percentage": 60.0}
  },
  "transactions_processed": 3,
  "valid_transactions": 3,
  "invalid_transactions": 0
}"#;

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start a server that answers every generate call with a valid report
    pub async fn start() -> Self {
        Self::start_with_response(SAMPLE_METRICS_RESPONSE).await
    }

    /// Start a server that answers every generate call with `response` as
    /// the model text
    pub async fn start_with_response(response: impl Into<String>) -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(Arc::new(response.into()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(
    State(response): State<Arc<String>>,
    Json(request): Json<GenerateRequest>,
) -> Json<GenerateResponse> {
    Json(GenerateResponse {
        model: request.model,
        response: response.as_ref().clone(),
        done: true,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    #[allow(dead_code)]
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}
