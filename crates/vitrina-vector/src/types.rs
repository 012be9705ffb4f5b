//! Common types for the vector backends.
//!
//! These types are shared by the remote collection client, the in-memory
//! store, and the ingester, and are always available regardless of which
//! backend a deployment uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrina_catalog::PointPayload;
use vitrina_core::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Vector backend configuration.
///
/// Covers the remote collection (URL, name, schema, batching) and the
/// local flat index (file path). Defaults mirror the reference deployment:
/// dimension 1000, batch size 1000, cosine metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Base URL of the remote vector backend.
    #[serde(default = "default_url")]
    pub url: String,

    /// Remote collection name.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Embedding dimension every vector must have.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Distance metric for the remote collection.
    #[serde(default = "default_metric")]
    pub metric: Metric,

    /// Rows per ingestion batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout for backend calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry attempts for a failed batch upload (transient failures only).
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Batches uploaded concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Path of the persisted local flat index.
    pub index_path: Option<String>,
}

fn default_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "image-search-engine".to_string()
}

fn default_dimension() -> usize {
    1000
}

fn default_metric() -> Metric {
    Metric::Cosine
}

fn default_batch_size() -> usize {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> usize {
    3
}

fn default_concurrency() -> usize {
    4
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            collection: default_collection(),
            dimension: default_dimension(),
            metric: default_metric(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            concurrency: default_concurrency(),
            index_path: None,
        }
    }
}

impl VectorConfig {
    /// Fail-fast validation of values no operation can work with.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::config("vector.dimension must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("vector.batch_size must be greater than 0"));
        }
        if self.concurrency == 0 {
            return Err(Error::config("vector.concurrency must be greater than 0"));
        }
        if self.url.trim().is_empty() {
            return Err(Error::config("vector.url must not be empty"));
        }
        if self.collection.trim().is_empty() {
            return Err(Error::config("vector.collection must not be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Metric
// ============================================================================

/// Distance metric of the remote collection.
///
/// Serialized in the backend's own capitalized spelling. The local flat
/// index always uses squared-Euclidean distance and is not configured
/// through this type; the two backends do not rank identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Cosine similarity (higher score is closer).
    Cosine,
    /// Euclidean distance (lower score is closer).
    Euclid,
}

impl Metric {
    /// Wire spelling of the metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "Cosine",
            Self::Euclid => "Euclid",
        }
    }

    /// Ordering that ranks the closer of two backend scores first.
    ///
    /// Score direction depends on the metric: cosine similarity ranks
    /// higher scores first, Euclidean distance ranks lower ones first.
    pub fn closer_first(&self, a: f32, b: f32) -> std::cmp::Ordering {
        match self {
            Self::Cosine => b.total_cmp(&a),
            Self::Euclid => a.total_cmp(&b),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Points and hits
// ============================================================================

/// The unit of storage in the remote collection.
///
/// Built only by the ingester through the validated payload constructor;
/// immutable once written except by re-ingestion under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPoint {
    /// Catalog row id; the upsert key.
    pub id: u64,
    /// Embedding vector of dimension `VectorConfig::dimension`.
    pub vector: Vec<f32>,
    /// Catalog metadata plus the derived sale rate.
    pub payload: PointPayload,
}

/// One remote-backend search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHit {
    /// Point id (catalog row id).
    pub id: u64,
    /// Backend-native score; for cosine higher is closer, for Euclid
    /// lower is closer.
    pub score: f32,
    /// Payload stored with the point, when the backend returned it.
    pub payload: Option<PointPayload>,
}

/// Schema and size of an existing remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    /// Backend-reported collection status ("green", "yellow", ...).
    pub status: String,
    /// Number of points currently stored.
    pub points_count: u64,
    /// Configured vector dimension.
    pub dimension: usize,
    /// Configured distance metric, in wire spelling.
    pub distance: String,
}

// ============================================================================
// Reports
// ============================================================================

/// Summary of one completed ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Rows uploaded.
    pub total_items: usize,
    /// Batches issued.
    pub batches: usize,
    /// Configured rows per batch.
    pub batch_size: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}
