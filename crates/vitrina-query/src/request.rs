//! Request model and router configuration.

use serde::{Deserialize, Serialize};
use vitrina_core::{Error, Result};

/// Settings for the query router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Result cap applied when a request does not carry its own.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    3
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl QueryConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::config("top_k must be at least 1"));
        }
        Ok(())
    }
}

/// One query, routed to exactly one backend.
///
/// There is no fallback between backends: when the targeted backend
/// fails, the query fails with that backend named in the error.
#[derive(Debug, Clone)]
pub enum SearchQuery {
    /// Nearest neighbors of a raw embedding, via the remote collection.
    Vector(Vec<f32>),
    /// Nearest neighbors of a raw embedding, via the local flat index.
    Local(Vec<f32>),
    /// Image bytes, embedded and then searched like [`SearchQuery::Vector`].
    Image(Vec<u8>),
    /// Full-text match on item names.
    Text(String),
    /// Prefix completion on item names.
    Complete(String),
}

/// A query plus an optional per-request result cap.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// The query to route.
    pub query: SearchQuery,
    /// Result cap for this request; the router's configured default
    /// applies when absent.
    pub top_k: Option<usize>,
}

impl SearchRequest {
    /// Creates a request using the router's default result cap.
    pub fn new(query: SearchQuery) -> Self {
        Self { query, top_k: None }
    }

    /// Sets a per-request result cap.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}
