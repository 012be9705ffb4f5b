//! Batched catalog ingestion into a vector collection.
//!
//! The ingester slices the catalog into contiguous, ascending batches,
//! uploads them with bounded parallelism, and retries transient backend
//! failures per batch. A failed batch never aborts its siblings: every
//! batch gets its full set of attempts, and the failure for the
//! lowest-indexed batch is what the caller sees.
//!
//! Uploads are keyed by catalog id, so re-running ingestion over the same
//! inputs replaces points instead of duplicating them.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use vitrina_catalog::{Catalog, PointPayload};
use vitrina_core::{Error, OpTimer, Result};

use crate::store::VectorStore;
use crate::types::{IndexedPoint, IngestReport, VectorConfig};

/// Writes a catalog into a vector collection in batches.
pub struct CollectionIngester {
    store: Arc<dyn VectorStore>,
    config: VectorConfig,
}

impl CollectionIngester {
    /// Creates an ingester targeting `store` with the given settings.
    pub fn new(store: Arc<dyn VectorStore>, config: VectorConfig) -> Self {
        Self { store, config }
    }

    /// Settings this ingester runs with.
    pub fn config(&self) -> &VectorConfig {
        &self.config
    }

    /// Makes sure the target collection exists with the configured shape.
    ///
    /// Creates the collection when absent. When present, verifies that its
    /// dimension and distance metric match the configuration and fails
    /// without touching it otherwise; a compatible collection is reused
    /// as-is, so calling this any number of times is safe.
    pub async fn ensure_collection(&self) -> Result<()> {
        let name = &self.config.collection;
        match self.store.collection_info(name).await? {
            Some(info) => {
                if info.dimension != self.config.dimension {
                    return Err(Error::schema_mismatch(format!(
                        "collection '{name}' has dimension {}, expected {}",
                        info.dimension, self.config.dimension
                    )));
                }
                if info.distance != self.config.metric.as_str() {
                    return Err(Error::schema_mismatch(format!(
                        "collection '{name}' uses metric {}, expected {}",
                        info.distance, self.config.metric
                    )));
                }
                log::debug!(
                    "collection '{name}' already exists with {} points, reusing",
                    info.points_count
                );
                Ok(())
            }
            None => {
                self.store
                    .create_collection(name, self.config.dimension, self.config.metric)
                    .await
            }
        }
    }

    /// Uploads the whole catalog into the collection.
    ///
    /// Fails before any write when the catalog's vector dimension does not
    /// match the configured collection dimension. Batches run with bounded
    /// parallelism; each failed batch is reported, and the error returned
    /// is the one for the lowest batch index.
    pub async fn ingest(&self, catalog: &Catalog) -> Result<IngestReport> {
        let timer = OpTimer::start("catalog ingest");

        if catalog.dimension() != self.config.dimension {
            return Err(Error::schema_mismatch(format!(
                "catalog vectors have dimension {}, collection '{}' is configured for {}",
                catalog.dimension(),
                self.config.collection,
                self.config.dimension
            )));
        }

        self.ensure_collection().await?;

        let ranges = batch_ranges(catalog.len(), self.config.batch_size);
        let total_batches = ranges.len();
        log::info!(
            "ingesting {} items into '{}' in {total_batches} batches of up to {}",
            catalog.len(),
            self.config.collection,
            self.config.batch_size
        );

        let completed = AtomicUsize::new(0);
        let results: Vec<Result<()>> = stream::iter(ranges.into_iter().enumerate())
            .map(|(index, range)| {
                let completed = &completed;
                async move {
                    self.upload_batch(catalog, index, range, total_batches, completed)
                        .await
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut failures: Vec<Error> = results.into_iter().filter_map(|r| r.err()).collect();
        if !failures.is_empty() {
            failures.sort_by_key(|e| e.batch_index().unwrap_or(usize::MAX));
            for extra in failures.iter().skip(1) {
                log::error!("additional batch failure: {extra}");
            }
            return Err(failures.remove(0));
        }

        let report = IngestReport {
            total_items: catalog.len(),
            batches: total_batches,
            batch_size: self.config.batch_size,
            duration_ms: timer.elapsed_ms(),
            completed_at: Utc::now(),
        };
        let per_sec = report.total_items as f64 * 1000.0 / report.duration_ms.max(1) as f64;
        timer.finish_with(format!("{} items, {per_sec:.0} items/s", report.total_items));
        Ok(report)
    }

    async fn upload_batch(
        &self,
        catalog: &Catalog,
        index: usize,
        range: Range<usize>,
        total_batches: usize,
        completed: &AtomicUsize,
    ) -> Result<()> {
        let points = batch_points(catalog, range).map_err(|e| Error::ingest(index, e))?;

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(self.config.max_retries);

        (|| async {
            self.store
                .upsert_points(&self.config.collection, &points)
                .await
        })
        .retry(backoff)
        .when(Error::is_retryable)
        .notify(|err, delay| {
            log::warn!("batch {index} upload failed, retrying in {delay:?}: {err}");
        })
        .await
        .map_err(|e| Error::ingest(index, e))?;

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!(
            "ingest progress: batch {done}/{total_batches} ({} points)",
            points.len()
        );
        Ok(())
    }
}

/// Slices `0..total` into contiguous ascending ranges of at most
/// `batch_size` items.
///
/// Produces `ceil(total / batch_size)` ranges; only the last may be
/// short. Empty input yields no ranges.
pub fn batch_ranges(total: usize, batch_size: usize) -> Vec<Range<usize>> {
    if batch_size == 0 {
        return Vec::new();
    }
    (0..total)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(total))
        .collect()
}

/// Builds the upload points for one batch of catalog entries.
///
/// Any invalid record fails the whole batch; the error names the row.
fn batch_points(catalog: &Catalog, range: Range<usize>) -> Result<Vec<IndexedPoint>> {
    catalog.entries()[range]
        .iter()
        .map(|entry| {
            let payload = PointPayload::from_record(entry.id, &entry.record)?;
            Ok(IndexedPoint {
                id: entry.id,
                vector: entry.vector.clone(),
                payload,
            })
        })
        .collect()
}
