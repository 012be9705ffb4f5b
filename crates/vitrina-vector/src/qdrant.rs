//! Qdrant REST client for the remote vector collection.
//!
//! Speaks the collection API directly over HTTP: create/inspect
//! collections, upsert point batches, nearest-neighbor search. Transient
//! transport failures (HTTP 429/5xx, connection loss, timeouts) map to
//! retryable errors so the ingester can back off and retry a batch;
//! everything else is permanent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use vitrina_catalog::PointPayload;
use vitrina_core::{Error, Result};

use crate::store::VectorStore;
use crate::types::{CollectionInfo, IndexedPoint, Metric, ScoredHit, VectorConfig};

/// REST client for a Qdrant-compatible vector backend.
#[derive(Debug, Clone)]
pub struct QdrantClient {
    base_url: String,
    metric: Metric,
    client: reqwest::Client,
}

impl QdrantClient {
    /// Creates a client for the backend at `base_url`, ordering hits by
    /// cosine score.
    ///
    /// The timeout applies per request; a batch that exceeds it fails
    /// wholesale and is retried wholesale.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("building HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            metric: Metric::Cosine,
            client,
        })
    }

    /// Sets the metric search hits are ordered by.
    ///
    /// Must match the metric of the collections this client searches:
    /// cosine scores rank descending, Euclidean distances ascending.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Creates a client from the vector backend configuration.
    pub fn from_config(config: &VectorConfig) -> Result<Self> {
        Ok(Self::new(&config.url, Duration::from_secs(config.timeout_secs))?
            .with_metric(config.metric))
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Metric search hits are ordered by.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Liveness check: list collections.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/collections", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| send_error("listing collections", e))?;
        check_status("listing collections", response).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantClient {
    async fn create_collection(&self, name: &str, dimension: usize, metric: Metric) -> Result<()> {
        let url = format!("{}/collections/{}", self.base_url, name);
        let body = serde_json::json!({
            "vectors": { "size": dimension, "distance": metric.as_str() }
        });

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("creating collection", e))?;
        check_status("creating collection", response).await?;
        log::info!("created collection '{name}' (dimension {dimension}, metric {metric})");
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let url = format!("{}/collections/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| send_error("fetching collection info", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status("fetching collection info", response).await?;
        let parsed: CollectionInfoResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(format!("parsing collection info: {e}")))?;
        Ok(Some(parsed.into_info()))
    }

    async fn upsert_points(&self, name: &str, points: &[IndexedPoint]) -> Result<()> {
        let url = format!("{}/collections/{}/points?wait=true", self.base_url, name);
        let body = serde_json::json!({ "points": points });

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("upserting points", e))?;
        check_status("upserting points", response).await?;
        log::debug!("upserted {} points into '{name}'", points.len());
        Ok(())
    }

    async fn search(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredHit>> {
        let url = format!("{}/collections/{}/points/search", self.base_url, name);
        let body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("searching collection", e))?;
        let response = check_status("searching collection", response).await?;
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(format!("parsing search response: {e}")))?;

        let mut hits: Vec<ScoredHit> = parsed.result.into_iter().map(WireHit::into_hit).collect();
        sort_hits(&mut hits, self.metric);
        hits.truncate(limit);
        Ok(hits)
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}

/// Order hits closest-first for `metric`, ties by ascending id.
///
/// The backend already ranks, but tie order there is unspecified; the
/// re-sort pins it down. Score direction follows the metric: descending
/// for cosine, ascending for Euclidean distance.
pub(crate) fn sort_hits(hits: &mut [ScoredHit], metric: Metric) {
    hits.sort_by(|a, b| metric.closer_first(a.score, b.score).then(a.id.cmp(&b.id)));
}

fn send_error(op: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("{op}: request exceeded client timeout"))
    } else if err.is_connect() {
        Error::backend_transient(format!("{op}: {err}"))
    } else {
        Error::backend(format!("{op}: {err}"))
    }
}

async fn check_status(op: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());
    Err(classify_status(status, format!("{op}: HTTP {status}: {body}")))
}

/// Map an HTTP error status to the right error class.
///
/// 429 and 5xx are transient; everything else in the error range is a
/// permanent client-side fault.
fn classify_status(status: StatusCode, message: String) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Error::backend_transient(message)
    } else {
        Error::backend(message)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfoResult,
}

#[derive(Debug, Deserialize)]
struct CollectionInfoResult {
    status: String,
    #[serde(default)]
    points_count: Option<u64>,
    config: CollectionConfigWire,
}

#[derive(Debug, Deserialize)]
struct CollectionConfigWire {
    params: CollectionParamsWire,
}

#[derive(Debug, Deserialize)]
struct CollectionParamsWire {
    vectors: VectorParamsWire,
}

#[derive(Debug, Deserialize)]
struct VectorParamsWire {
    size: usize,
    distance: String,
}

impl CollectionInfoResponse {
    fn into_info(self) -> CollectionInfo {
        CollectionInfo {
            status: self.result.status,
            points_count: self.result.points_count.unwrap_or(0),
            dimension: self.result.config.params.vectors.size,
            distance: self.result.config.params.vectors.distance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<WireHit>,
}

#[derive(Debug, Deserialize)]
struct WireHit {
    id: u64,
    score: f32,
    #[serde(default)]
    payload: Option<PointPayload>,
}

impl WireHit {
    fn into_hit(self) -> ScoredHit {
        ScoredHit {
            id: self.id,
            score: self.score,
            payload: self.payload,
        }
    }
}
