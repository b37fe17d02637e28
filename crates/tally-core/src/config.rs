//! Configuration loading
//!
//! Config is resolved in three layers:
//! 1. Built-in defaults
//! 2. `config.toml` in the data directory (optional)
//! 3. Environment variables (`AI_BACKEND`, `OLLAMA_HOST`, `OLLAMA_MODEL`)
//!
//! The data directory itself comes from the caller (e.g. `--data-dir`), then
//! `TALLY_DATA_DIR`, then the platform data dir (`~/.local/share/tally`).
//!
//! ```toml
//! default_budget = 2500.0
//!
//! [ai]
//! backend = "ollama"
//! host = "http://localhost:11434"
//! model = "llama3.2"
//! timeout_secs = 20
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{validate_budget, DEFAULT_BUDGET};

/// Name of the config file inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Enrichment backend settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Backend name: ollama, mock or none
    pub backend: String,
    /// Server URL; the ollama backend is disabled without one
    pub host: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "ollama".to_string(),
            host: None,
            model: "llama3.2".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    default_budget: Option<f64>,
    ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the store and config file
    pub data_dir: PathBuf,
    /// Budget used when none has been saved yet
    pub default_budget: f64,
    pub ai: AiConfig,
}

impl Config {
    /// Built-in defaults for a data directory
    pub fn defaults(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            default_budget: DEFAULT_BUDGET,
            ai: AiConfig::default(),
        }
    }

    /// Resolve the data directory: explicit path, `TALLY_DATA_DIR`, platform default
    pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
        if let Some(dir) = explicit {
            return dir.to_path_buf();
        }
        if let Ok(dir) = std::env::var("TALLY_DATA_DIR") {
            return PathBuf::from(dir);
        }
        dirs::data_local_dir()
            .map(|d| d.join("tally"))
            .unwrap_or_else(|| PathBuf::from(".tally"))
    }

    /// Load configuration for a data directory, applying environment overrides
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            tracing::debug!("Loading config from {}", path.display());
            Self::from_toml_str(&content, data_dir)?
        } else {
            Self::defaults(data_dir)
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file's content
    pub fn from_toml_str(content: &str, data_dir: &Path) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;

        let default_budget = match file.default_budget {
            Some(budget) => {
                validate_budget(budget).map_err(|e| Error::Config(e.to_string()))?
            }
            None => DEFAULT_BUDGET,
        };

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            default_budget,
            ai: file.ai,
        })
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("AI_BACKEND") {
            self.ai.backend = backend;
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.ai.host = Some(host);
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.ai.model = model;
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }
}
