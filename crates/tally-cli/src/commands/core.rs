//! Shared command utilities
//!
//! - `load_config` - Resolve the data directory and load config.toml
//! - `open_state` - Open the file store and load application state
//! - `analyzer_from_config` - Build an analyzer for the configured AI backend

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::models::parse_iso_date;
use tally_core::{AIClient, Analyzer, AppState, Config, FileStore};
use tracing::warn;

/// Load configuration, falling back to defaults if config.toml is malformed
pub fn load_config(data_dir: Option<&Path>) -> Config {
    let dir = Config::resolve_data_dir(data_dir);
    match Config::load(&dir) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config in {}: {}", dir.display(), e);
            let mut config = Config::defaults(&dir);
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
    }
}

/// Open the store in the data directory and load state from it
pub fn open_state(config: &Config) -> Result<AppState<FileStore>> {
    let store = FileStore::open(&config.data_dir).with_context(|| {
        format!("Failed to open data directory {}", config.data_dir.display())
    })?;
    AppState::load(store, config.default_budget).context("Failed to load saved data")
}

/// Analyzer using the configured AI backend, local-only if none is configured
pub fn analyzer_from_config(config: &Config) -> Analyzer {
    Analyzer::new(AIClient::from_config(&config.ai))
}

/// Parse a `--date` argument
pub fn parse_date_arg(date: &str) -> Result<NaiveDate> {
    parse_iso_date(date)
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", date))
}
