//! Handler functions for search CLI commands.
//!
//! These functions implement the logic behind `vitrina search vector`,
//! `vitrina search text`, and `vitrina search complete`.

use std::sync::Arc;

use vitrina_catalog::{Catalog, FeatureStore, Product};
use vitrina_core::{Error, Result};
use vitrina_fts::TextBackend;
use vitrina_query::{QueryRouter, SearchQuery, SearchRequest};
use vitrina_vector::{FlatIndex, VectorStore};

use crate::config::VitrinaConfig;

// ============================================================================
// Option types
// ============================================================================

/// Options for vector search commands.
#[derive(Debug, Clone, Default)]
pub struct VectorSearchOptions {
    /// Path of a JSON file holding the query vector.
    pub file: Option<String>,
    /// Catalog row whose stored embedding becomes the query.
    pub id: Option<u64>,
    /// Result cap, overriding `query.top_k`.
    pub top_k: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Similarity search against the remote vector collection.
pub async fn handle_remote_search(
    config: &VitrinaConfig,
    store: Arc<dyn VectorStore>,
    options: VectorSearchOptions,
) -> Result<()> {
    let vector = resolve_query_vector(config, &options)?;
    let router =
        QueryRouter::new(config.query.clone()).with_remote(store, &config.vector.collection);

    let products = router
        .run(&request(SearchQuery::Vector(vector), options.top_k))
        .await?;
    print_products(&products);
    Ok(())
}

/// Similarity search against the persisted local flat index.
pub async fn handle_local_search(
    config: &VitrinaConfig,
    options: VectorSearchOptions,
) -> Result<()> {
    let path = config.vector.index_path.as_deref().ok_or_else(|| {
        Error::config("vector.index_path is not set — run `vitrina index` after configuring it")
    })?;
    let index = FlatIndex::load(path)?;
    let catalog = Catalog::load(&config.catalog.features_path, &config.catalog.data_path)?;
    let vector = resolve_query_vector(config, &options)?;
    let router = QueryRouter::new(config.query.clone()).with_local(index, catalog);

    let products = router
        .run(&request(SearchQuery::Local(vector), options.top_k))
        .await?;
    print_products(&products);
    Ok(())
}

/// Free-text search through the full-text backend.
pub async fn handle_text_search(
    config: &VitrinaConfig,
    backend: Arc<dyn TextBackend>,
    query: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let router = QueryRouter::new(config.query.clone()).with_text(backend);
    let products = router
        .run(&request(SearchQuery::Text(query.to_string()), top_k))
        .await?;
    print_products(&products);
    Ok(())
}

/// Prefix completion through the full-text backend.
pub async fn handle_complete(
    config: &VitrinaConfig,
    backend: Arc<dyn TextBackend>,
    prefix: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let router = QueryRouter::new(config.query.clone()).with_text(backend);
    let products = router
        .run(&request(SearchQuery::Complete(prefix.to_string()), top_k))
        .await?;
    print_products(&products);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve the query vector from exactly one of `--file` or `--id`.
fn resolve_query_vector(config: &VitrinaConfig, options: &VectorSearchOptions) -> Result<Vec<f32>> {
    match (&options.file, options.id) {
        (Some(_), Some(_)) => Err(Error::config("--file and --id are mutually exclusive")),
        (None, None) => Err(Error::config("one of --file or --id is required")),
        (Some(path), None) => {
            let content =
                std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
            serde_json::from_str::<Vec<f32>>(&content).map_err(|e| {
                Error::config(format!("{path} is not a JSON array of numbers: {e}"))
            })
        }
        (None, Some(id)) => {
            let features = FeatureStore::load(&config.catalog.features_path)?;
            features
                .row(id as usize)
                .map(<[f32]>::to_vec)
                .ok_or_else(|| {
                    Error::config(format!(
                        "row {id} is out of range ({} rows in {})",
                        features.len(),
                        config.catalog.features_path
                    ))
                })
        }
    }
}

fn request(query: SearchQuery, top_k: Option<usize>) -> SearchRequest {
    let request = SearchRequest::new(query);
    match top_k {
        Some(k) => request.with_top_k(k),
        None => request,
    }
}

/// Print results as a numbered list, closest first.
fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No results.");
        return;
    }
    for (i, product) in products.iter().enumerate() {
        println!(
            "{}. {} — {} (sale {} / fixed {}, rate {:.2})",
            i + 1,
            product.item_name,
            product.shop_name,
            product.sale_item_price,
            product.fixed_item_price,
            product.sale_rate
        );
        println!("   {}", product.item_path);
    }
    println!("\n{} result(s)", products.len());
}

// ============================================================================
// Tests
// ============================================================================
