//! Pipeline configuration loaded from YAML.
//!
//! ```yaml
//! sources:
//!   - outlet: cnn
//!     max_articles: 5
//!     fetch_delay_secs: 3
//!   - outlet: ap_news
//! llm_max_retries: 5
//! request_timeout_secs: 20
//! ```
//!
//! Source order matters: articles are consolidated in the order the sources
//! are listed, and earlier sources win when two articles are duplicates.
//! LLM endpoint settings live in `awful_aj`'s own `config.yaml`.

use crate::error::ConfigError;
use crate::sources::Outlet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub outlet: Outlet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_articles: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_delay_secs: Option<u64>,
}

impl SourceConfig {
    pub fn new(outlet: Outlet) -> Self {
        Self {
            outlet,
            max_articles: None,
            fetch_delay_secs: None,
        }
    }

    pub fn max_articles(&self) -> usize {
        self.max_articles
            .unwrap_or_else(|| self.outlet.default_max_articles())
    }

    pub fn fetch_delay(&self) -> Duration {
        self.fetch_delay_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.outlet.default_fetch_delay())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DigestConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default = "default_llm_max_retries")]
    pub llm_max_retries: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(Outlet::Cnn),
        SourceConfig::new(Outlet::ApNews),
    ]
}

fn default_llm_max_retries() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    20
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            llm_max_retries: default_llm_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DigestConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        info!(sources = config.sources.len(), "Loaded digest config");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Replace the source sequence, keeping per-outlet settings already
    /// configured for outlets that stay.
    pub fn with_outlets(mut self, outlets: &[Outlet]) -> Self {
        self.sources = outlets
            .iter()
            .map(|outlet| {
                self.sources
                    .iter()
                    .find(|s| s.outlet == *outlet)
                    .cloned()
                    .unwrap_or_else(|| SourceConfig::new(*outlet))
            })
            .collect();
        self
    }

    /// Override the article cap of every source.
    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        for source in &mut self.sources {
            source.max_articles = Some(max_articles);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
