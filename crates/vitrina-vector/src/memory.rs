//! In-memory vector store for testing.
//!
//! Behaves like the remote backend without a network: collections with a
//! fixed dimension and metric, keyed upserts (re-upserting an id replaces
//! the point), search scored and ordered by the collection's metric.
//! Failure injection lets ingestion retry paths be exercised
//! deterministically.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use vitrina_core::{Error, Result};

use crate::store::VectorStore;
use crate::types::{CollectionInfo, IndexedPoint, Metric, ScoredHit};

/// Vector store backed by process memory.
///
/// Clones share state, so a test can hand one clone to the code under
/// test and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MemoryVectorStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    collections: HashMap<String, MemoryCollection>,
    fail_next_upserts: usize,
    upsert_calls: usize,
}

struct MemoryCollection {
    dimension: usize,
    metric: Metric,
    points: BTreeMap<u64, IndexedPoint>,
}

impl MemoryVectorStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose first `n` upsert calls fail with a
    /// retryable error before succeeding.
    pub fn with_failing_upserts(n: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                fail_next_upserts: n,
                ..MemoryState::default()
            })),
        }
    }

    /// Number of upsert calls made so far, including failed ones.
    pub async fn upsert_calls(&self) -> usize {
        self.state.lock().await.upsert_calls
    }

    /// Ids stored in `collection`, ascending. Empty when the collection
    /// does not exist.
    pub async fn point_ids(&self, collection: &str) -> Vec<u64> {
        let state = self.state.lock().await;
        state
            .collections
            .get(collection)
            .map(|c| c.points.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Stored vector for one point, if present.
    pub async fn point_vector(&self, collection: &str, id: u64) -> Option<Vec<f32>> {
        let state = self.state.lock().await;
        state
            .collections
            .get(collection)
            .and_then(|c| c.points.get(&id))
            .map(|p| p.vector.clone())
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn create_collection(&self, name: &str, dimension: usize, metric: Metric) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.collections.contains_key(name) {
            return Err(Error::backend(format!(
                "collection '{name}' already exists"
            )));
        }
        state.collections.insert(
            name.to_string(),
            MemoryCollection {
                dimension,
                metric,
                points: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let state = self.state.lock().await;
        Ok(state.collections.get(name).map(|c| CollectionInfo {
            status: "green".to_string(),
            points_count: c.points.len() as u64,
            dimension: c.dimension,
            distance: c.metric.as_str().to_string(),
        }))
    }

    async fn upsert_points(&self, name: &str, points: &[IndexedPoint]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.upsert_calls += 1;
        if state.fail_next_upserts > 0 {
            state.fail_next_upserts -= 1;
            return Err(Error::backend_transient("injected upsert failure"));
        }
        let collection = state
            .collections
            .get_mut(name)
            .ok_or_else(|| Error::backend(format!("collection '{name}' does not exist")))?;
        for point in points {
            if point.vector.len() != collection.dimension {
                return Err(Error::backend(format!(
                    "point {} has dimension {}, collection '{name}' expects {}",
                    point.id,
                    point.vector.len(),
                    collection.dimension
                )));
            }
            collection.points.insert(point.id, point.clone());
        }
        Ok(())
    }

    async fn search(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredHit>> {
        let state = self.state.lock().await;
        let collection = state
            .collections
            .get(name)
            .ok_or_else(|| Error::backend(format!("collection '{name}' does not exist")))?;
        if vector.len() != collection.dimension {
            return Err(Error::backend(format!(
                "query has dimension {}, collection '{name}' expects {}",
                vector.len(),
                collection.dimension
            )));
        }

        let metric = collection.metric;
        let mut hits: Vec<ScoredHit> = collection
            .points
            .values()
            .map(|p| ScoredHit {
                id: p.id,
                score: match metric {
                    Metric::Cosine => cosine_similarity(vector, &p.vector),
                    Metric::Euclid => euclidean_distance(vector, &p.vector),
                },
                payload: Some(p.payload.clone()),
            })
            .collect();
        hits.sort_by(|a, b| metric.closer_first(a.score, b.score).then(a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
