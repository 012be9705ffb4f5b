//! Query routing across the vector, local, and text backends.
//!
//! Each query targets exactly one backend; there is no fallback, and a
//! failure surfaces as a search error naming the backend it happened on.
//! Every route produces the same unified `Product` list, capped at the
//! requested result count, with an empty list being a perfectly valid
//! answer.

use std::sync::Arc;
use std::time::Duration;

use vitrina_catalog::{Catalog, PointPayload, Product};
use vitrina_core::{Error, OpTimer, Result};
use vitrina_fts::TextBackend;
use vitrina_vector::{FlatIndex, VectorStore};

use crate::embed::ImageEmbedder;
use crate::request::{QueryConfig, SearchQuery, SearchRequest};

/// Routes search requests to the configured backends.
///
/// Arms are attached individually; a query against a missing arm fails
/// with a configuration cause wrapped in the backend's search error, so
/// callers see the same error shape for "not wired up" and "fell over".
pub struct QueryRouter {
    config: QueryConfig,
    remote: Option<RemoteArm>,
    local: Option<LocalArm>,
    text: Option<Arc<dyn TextBackend>>,
    embedder: Option<Arc<dyn ImageEmbedder>>,
}

struct RemoteArm {
    store: Arc<dyn VectorStore>,
    collection: String,
}

struct LocalArm {
    index: FlatIndex,
    catalog: Catalog,
}

impl QueryRouter {
    /// Creates a router with no backends attached.
    pub fn new(config: QueryConfig) -> Self {
        Self {
            config,
            remote: None,
            local: None,
            text: None,
            embedder: None,
        }
    }

    /// Attaches the remote vector collection.
    pub fn with_remote(mut self, store: Arc<dyn VectorStore>, collection: impl Into<String>) -> Self {
        self.remote = Some(RemoteArm {
            store,
            collection: collection.into(),
        });
        self
    }

    /// Attaches the local flat index together with the catalog its ids
    /// point into.
    pub fn with_local(mut self, index: FlatIndex, catalog: Catalog) -> Self {
        self.local = Some(LocalArm { index, catalog });
        self
    }

    /// Attaches the full-text backend.
    pub fn with_text(mut self, backend: Arc<dyn TextBackend>) -> Self {
        self.text = Some(backend);
        self
    }

    /// Attaches the image embedder used by image queries.
    pub fn with_embedder(mut self, embedder: Arc<dyn ImageEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Default result cap for requests that do not carry their own.
    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }

    /// Routes one request to its backend.
    pub async fn run(&self, request: &SearchRequest) -> Result<Vec<Product>> {
        let top_k = request.top_k.unwrap_or(self.config.top_k);
        match &request.query {
            SearchQuery::Vector(vector) => self.search_by_vector(vector, top_k).await,
            SearchQuery::Local(vector) => self.search_local(vector, top_k).await,
            SearchQuery::Image(image) => self.search_by_image(image, top_k).await,
            SearchQuery::Text(query) => self.search_by_text(query, top_k).await,
            SearchQuery::Complete(prefix) => self.autocomplete(prefix, top_k).await,
        }
    }

    /// Routes one request, giving up when `deadline` elapses first.
    ///
    /// A deadline expiry is a cancellation, distinct from a backend's own
    /// timeout (which stays a search error naming that backend).
    pub async fn run_with_deadline(
        &self,
        request: &SearchRequest,
        deadline: Duration,
    ) -> Result<Vec<Product>> {
        match tokio::time::timeout(deadline, self.run(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::cancelled(format!(
                "query abandoned after {deadline:?}"
            ))),
        }
    }

    /// Nearest neighbors of `vector` in the remote collection.
    pub async fn search_by_vector(&self, vector: &[f32], top_k: usize) -> Result<Vec<Product>> {
        let arm = self
            .remote
            .as_ref()
            .ok_or_else(|| unconfigured("vector", "no remote vector backend attached"))?;
        let timer = OpTimer::start("vector search");

        let hits = arm
            .store
            .search(&arm.collection, vector, top_k)
            .await
            .map_err(|e| Error::search("vector", e))?;

        let mut products = hits
            .into_iter()
            .map(|hit| {
                let payload = hit.payload.ok_or_else(|| {
                    Error::search(
                        "vector",
                        Error::serialization(format!("hit {} carries no payload", hit.id)),
                    )
                })?;
                Ok(Product::from(payload))
            })
            .collect::<Result<Vec<_>>>()?;
        products.truncate(top_k);

        timer.finish_with(format!("{} hits", products.len()));
        Ok(products)
    }

    /// Nearest neighbors of `vector` in the local flat index.
    pub async fn search_local(&self, vector: &[f32], top_k: usize) -> Result<Vec<Product>> {
        let arm = self
            .local
            .as_ref()
            .ok_or_else(|| unconfigured("local", "no local index attached"))?;
        let timer = OpTimer::start("local search");

        let hits = arm
            .index
            .search(vector, top_k)
            .map_err(|e| Error::search("local", e))?;

        let mut products = hits
            .into_iter()
            .map(|hit| {
                let entry = arm.catalog.get(hit.id).ok_or_else(|| {
                    Error::search(
                        "local",
                        Error::load(format!("index id {} is not in the catalog", hit.id)),
                    )
                })?;
                let payload = PointPayload::from_record(entry.id, &entry.record)
                    .map_err(|e| Error::search("local", e))?;
                Ok(Product::from(payload))
            })
            .collect::<Result<Vec<_>>>()?;
        products.truncate(top_k);

        timer.finish_with(format!("{} hits", products.len()));
        Ok(products)
    }

    /// Embeds `image` and searches the remote collection with the result.
    pub async fn search_by_image(&self, image: &[u8], top_k: usize) -> Result<Vec<Product>> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| unconfigured("vector", "no image embedder attached"))?;

        let vector = embedder
            .embed(image)
            .await
            .map_err(|e| Error::search("vector", e))?;
        log::debug!(
            "embedded {} image bytes into {} components via {}",
            image.len(),
            vector.len(),
            embedder.name()
        );
        self.search_by_vector(&vector, top_k).await
    }

    /// Full-text match on item names.
    pub async fn search_by_text(&self, query: &str, top_k: usize) -> Result<Vec<Product>> {
        let backend = self
            .text
            .as_ref()
            .ok_or_else(|| unconfigured("text", "no text backend attached"))?;
        let timer = OpTimer::start("text search");

        let mut products = backend
            .search(query, top_k)
            .await
            .map_err(|e| Error::search("text", e))?;
        products.truncate(top_k);

        timer.finish_with(format!("{} hits", products.len()));
        Ok(products)
    }

    /// Prefix completion on item names.
    pub async fn autocomplete(&self, prefix: &str, top_k: usize) -> Result<Vec<Product>> {
        let backend = self
            .text
            .as_ref()
            .ok_or_else(|| unconfigured("text", "no text backend attached"))?;
        let timer = OpTimer::start("autocomplete");

        let mut products = backend
            .complete(prefix, top_k)
            .await
            .map_err(|e| Error::search("text", e))?;
        products.truncate(top_k);

        timer.finish_with(format!("{} hits", products.len()));
        Ok(products)
    }
}

fn unconfigured(backend: &str, detail: &str) -> Error {
    Error::search(backend, Error::config(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vitrina_catalog::{CatalogEntry, CatalogRecord};
    use vitrina_fts::MockTextBackend;
    use vitrina_vector::{IndexedPoint, MemoryVectorStore, Metric};

    use crate::embed::MockImageEmbedder;

    fn record(id: u64, name: &str) -> CatalogRecord {
        CatalogRecord {
            item_path: format!("/items/{id}"),
            item_image: format!("https://img/{id}.jpg"),
            item_name: name.to_string(),
            fixed_item_price: 100,
            sale_item_price: 80,
            sales_number: id,
            shop_path: "/shops/1".to_string(),
            shop_name: "Test Shop".to_string(),
        }
    }

    fn product(name: &str) -> Product {
        Product {
            item_name: name.to_string(),
            item_path: format!("/items/{name}"),
            item_image: format!("https://img/{name}.jpg"),
            fixed_item_price: 100,
            sale_item_price: 80,
            sale_rate: 0.2,
            sales_number: 5,
            shop_path: "/shops/1".to_string(),
            shop_name: "Test Shop".to_string(),
        }
    }

    async fn seeded_store(vectors: &[(u64, Vec<f32>, &str)]) -> MemoryVectorStore {
        let dimension = vectors.first().map(|(_, v, _)| v.len()).unwrap_or(0);
        let store = MemoryVectorStore::new();
        store
            .create_collection("catalog", dimension, Metric::Cosine)
            .await
            .unwrap();
        let points: Vec<IndexedPoint> = vectors
            .iter()
            .map(|(id, vector, name)| IndexedPoint {
                id: *id,
                vector: vector.clone(),
                payload: PointPayload::from_record(*id, &record(*id, name)).unwrap(),
            })
            .collect();
        store.upsert_points("catalog", &points).await.unwrap();
        store
    }

    fn local_arm(rows: &[(u64, Vec<f32>, &str)]) -> (FlatIndex, Catalog) {
        let dimension = rows.first().map(|(_, v, _)| v.len()).unwrap_or(0);
        let vectors: Vec<&[f32]> = rows.iter().map(|(_, v, _)| v.as_slice()).collect();
        let index = FlatIndex::build(dimension, vectors).unwrap();
        let entries = rows
            .iter()
            .map(|(id, vector, name)| CatalogEntry {
                id: *id,
                vector: vector.clone(),
                record: record(*id, name),
            })
            .collect();
        (index, Catalog::from_entries(entries).unwrap())
    }

    // ------------------------------------------------------------------------
    // Vector route
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_vector_search_returns_products() {
        let store = seeded_store(&[
            (0, vec![1.0, 0.0], "red sneaker"),
            (1, vec![0.0, 1.0], "green hat"),
        ])
        .await;
        let router =
            QueryRouter::new(QueryConfig::default()).with_remote(Arc::new(store), "catalog");

        let products = router.search_by_vector(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].item_name, "red sneaker");
        assert!((products[0].sale_rate - 0.2).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_vector_search_empty_collection_is_ok() {
        let store = MemoryVectorStore::new();
        store
            .create_collection("catalog", 2, Metric::Cosine)
            .await
            .unwrap();
        let router =
            QueryRouter::new(QueryConfig::default()).with_remote(Arc::new(store), "catalog");

        let products = router.search_by_vector(&[1.0, 0.0], 3).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_vector_search_unconfigured() {
        let router = QueryRouter::new(QueryConfig::default());
        let err = router.search_by_vector(&[1.0], 3).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("vector"));
    }

    #[tokio::test]
    async fn test_vector_search_wraps_backend_error() {
        // Store without the collection: the backend fails, the router
        // names the backend.
        let store = MemoryVectorStore::new();
        let router =
            QueryRouter::new(QueryConfig::default()).with_remote(Arc::new(store), "catalog");

        let err = router.search_by_vector(&[1.0, 0.0], 3).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("vector"));
        assert!(err.to_string().contains("vector"));
    }

    // ------------------------------------------------------------------------
    // Local route
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_local_search_joins_catalog() {
        let (index, catalog) = local_arm(&[
            (0, vec![0.0, 0.0], "origin item"),
            (1, vec![3.0, 4.0], "far item"),
        ]);
        let router = QueryRouter::new(QueryConfig::default()).with_local(index, catalog);

        let products = router.search_local(&[0.1, 0.1], 1).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].item_name, "origin item");
    }

    #[tokio::test]
    async fn test_local_search_unconfigured() {
        let router = QueryRouter::new(QueryConfig::default());
        let err = router.search_local(&[1.0], 3).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("local"));
    }

    #[tokio::test]
    async fn test_local_search_wrong_dimension_wraps() {
        let (index, catalog) = local_arm(&[(0, vec![1.0, 0.0], "item")]);
        let router = QueryRouter::new(QueryConfig::default()).with_local(index, catalog);

        let err = router.search_local(&[1.0, 0.0, 0.0], 3).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("local"));
    }

    #[tokio::test]
    async fn test_local_search_invalid_row_surfaces() {
        let (index, mut catalog_rows) = {
            let rows = [(0u64, vec![1.0, 0.0], "broken item")];
            let vectors: Vec<&[f32]> = rows.iter().map(|(_, v, _)| v.as_slice()).collect();
            let index = FlatIndex::build(2, vectors).unwrap();
            let entries: Vec<CatalogEntry> = rows
                .iter()
                .map(|(id, vector, name)| CatalogEntry {
                    id: *id,
                    vector: vector.clone(),
                    record: record(*id, name),
                })
                .collect();
            (index, entries)
        };
        catalog_rows[0].record.fixed_item_price = 0;
        let catalog = Catalog::from_entries(catalog_rows).unwrap();
        let router = QueryRouter::new(QueryConfig::default()).with_local(index, catalog);

        let err = router.search_local(&[1.0, 0.0], 1).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("local"));
        assert!(err.to_string().contains("row 0"));
    }

    // ------------------------------------------------------------------------
    // Image route
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_image_search_embeds_then_searches() {
        let embedder = MockImageEmbedder::new(4);
        let image = b"fake image bytes";
        let target = embedder.embed(image).await.unwrap();

        let store = seeded_store(&[
            (0, target.clone(), "matching item"),
            (1, vec![-1.0, 0.0, 0.0, 0.0], "other item"),
        ])
        .await;
        let router = QueryRouter::new(QueryConfig::default())
            .with_remote(Arc::new(store), "catalog")
            .with_embedder(Arc::new(embedder));

        let products = router.search_by_image(image, 1).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].item_name, "matching item");
    }

    #[tokio::test]
    async fn test_image_search_requires_embedder() {
        let store = seeded_store(&[(0, vec![1.0, 0.0], "item")]).await;
        let router =
            QueryRouter::new(QueryConfig::default()).with_remote(Arc::new(store), "catalog");

        let err = router.search_by_image(b"img", 3).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("vector"));
        assert!(err.to_string().contains("embedder"));
    }

    // ------------------------------------------------------------------------
    // Text routes
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_text_search_routes_to_backend() {
        let mock = MockTextBackend::new(vec![product("red sneaker"), product("green hat")]);
        let router = QueryRouter::new(QueryConfig::default()).with_text(Arc::new(mock));

        let products = router.search_by_text("sneaker", 5).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].item_name, "red sneaker");
    }

    #[tokio::test]
    async fn test_text_no_match_is_empty_ok() {
        let mock = MockTextBackend::new(vec![product("red sneaker")]);
        let router = QueryRouter::new(QueryConfig::default()).with_text(Arc::new(mock));

        assert!(router.search_by_text("boots", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_timeout_becomes_text_search_error() {
        let mock = MockTextBackend::failing_with_timeout();
        let router = QueryRouter::new(QueryConfig::default()).with_text(Arc::new(mock));

        let err = router.search_by_text("sneaker", 5).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("text"));
        match err {
            Error::Search { backend, source } => {
                assert_eq!(backend, "text");
                assert!(matches!(*source, Error::Timeout(_)));
            }
            other => panic!("expected Search error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_autocomplete_routes_to_backend() {
        let mock = MockTextBackend::new(vec![product("red sneaker"), product("dark red hat")]);
        let router = QueryRouter::new(QueryConfig::default()).with_text(Arc::new(mock));

        let products = router.autocomplete("red", 5).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].item_name, "red sneaker");
    }

    #[tokio::test]
    async fn test_full_text_and_prefix_find_same_document() {
        let mock = MockTextBackend::new(vec![product("red sneaker"), product("green hat")]);
        let router = QueryRouter::new(QueryConfig::default()).with_text(Arc::new(mock));

        let by_text = router.search_by_text("red sneaker", 5).await.unwrap();
        assert_eq!(by_text.len(), 1);

        let by_prefix = router.autocomplete("red sn", 5).await.unwrap();
        assert_eq!(by_prefix.len(), 1);
        assert_eq!(by_text[0].item_name, by_prefix[0].item_name);
    }

    #[tokio::test]
    async fn test_no_fallback_between_backends() {
        // A healthy vector arm must not rescue a failing text query.
        let store = seeded_store(&[(0, vec![1.0, 0.0], "red sneaker")]).await;
        let mock = MockTextBackend::failing_with("text backend down");
        let router = QueryRouter::new(QueryConfig::default())
            .with_remote(Arc::new(store), "catalog")
            .with_text(Arc::new(mock));

        let err = router.search_by_text("sneaker", 5).await.unwrap_err();
        assert_eq!(err.backend_name(), Some("text"));
    }

    // ------------------------------------------------------------------------
    // run / top_k / deadline
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_run_uses_configured_default_top_k() {
        let mock = MockTextBackend::new(vec![
            product("sneaker a"),
            product("sneaker b"),
            product("sneaker c"),
        ]);
        let router = QueryRouter::new(QueryConfig { top_k: 2 }).with_text(Arc::new(mock));

        let request = SearchRequest::new(SearchQuery::Text("sneaker".to_string()));
        assert_eq!(router.run(&request).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_run_request_top_k_overrides_default() {
        let mock = MockTextBackend::new(vec![
            product("sneaker a"),
            product("sneaker b"),
            product("sneaker c"),
        ]);
        let router = QueryRouter::new(QueryConfig { top_k: 2 }).with_text(Arc::new(mock));

        let request = SearchRequest::new(SearchQuery::Text("sneaker".to_string())).with_top_k(1);
        assert_eq!(router.run(&request).await.unwrap().len(), 1);
    }

    struct SlowTextBackend;

    #[async_trait]
    impl TextBackend for SlowTextBackend {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Product>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(Vec::new())
        }

        async fn complete(&self, _prefix: &str, _limit: usize) -> Result<Vec<Product>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_cancellation() {
        let router = QueryRouter::new(QueryConfig::default()).with_text(Arc::new(SlowTextBackend));

        let request = SearchRequest::new(SearchQuery::Text("sneaker".to_string()));
        let err = router
            .run_with_deadline(&request, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_deadline_with_room_passes_through() {
        let mock = MockTextBackend::new(vec![product("red sneaker")]);
        let router = QueryRouter::new(QueryConfig::default()).with_text(Arc::new(mock));

        let request = SearchRequest::new(SearchQuery::Text("sneaker".to_string()));
        let products = router
            .run_with_deadline(&request, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
    }
}
