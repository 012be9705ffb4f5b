//! The remote vector backend contract.
//!
//! The ingester and the query router speak to the collection through this
//! trait, so the HTTP client can be swapped for the in-memory store in
//! tests without touching either of them.

use async_trait::async_trait;

use vitrina_core::Result;

use crate::types::{CollectionInfo, IndexedPoint, Metric, ScoredHit};

/// A named collection of vectors with attached payloads.
///
/// Upserts are idempotent per id: writing the same point twice replaces
/// it, never duplicates it. That property is what makes re-running an
/// ingestion after a partial failure safe.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection with the given schema.
    ///
    /// Fails if the collection already exists; callers that want
    /// create-if-absent go through `CollectionIngester::ensure_collection`.
    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: Metric,
    ) -> Result<()>;

    /// Fetch the schema and size of a collection.
    ///
    /// Returns `Ok(None)` when the collection does not exist; transport
    /// failures are errors.
    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>>;

    /// Upsert one batch of points as a single atomic call.
    async fn upsert_points(&self, name: &str, points: &[IndexedPoint]) -> Result<()>;

    /// Nearest-neighbor search returning up to `limit` hits with
    /// payloads, best first, ties broken by ascending id.
    async fn search(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredHit>>;

    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &str;
}
