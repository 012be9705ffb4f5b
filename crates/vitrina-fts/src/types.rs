//! Configuration for the full-text backend.

use serde::{Deserialize, Serialize};
use vitrina_core::{Error, Result};

/// Settings for the full-text search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Base URL of the search service.
    #[serde(default = "default_url")]
    pub url: String,

    /// Index the catalog documents live in.
    #[serde(default = "default_index")]
    pub index: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "text_search_index".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: default_index(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TextConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::config("text search url must not be empty"));
        }
        if self.index.is_empty() {
            return Err(Error::config("text search index must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("text search timeout must be at least 1s"));
        }
        Ok(())
    }
}
