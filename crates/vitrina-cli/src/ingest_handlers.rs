//! Handler functions for ingestion and index CLI commands.
//!
//! These functions implement the logic behind `vitrina ingest`,
//! `vitrina index`, and `vitrina health`.

use std::sync::Arc;

use vitrina_catalog::{Catalog, FeatureStore};
use vitrina_core::{Error, OpTimer, Result};
use vitrina_fts::ElasticBackend;
use vitrina_vector::{CollectionIngester, FlatIndex, QdrantClient, VectorStore, index_exists};

use crate::config::VitrinaConfig;

// ============================================================================
// Option types
// ============================================================================

/// Options for the ingest command.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Feature matrix path, overriding `catalog.features_path`.
    pub features: Option<String>,
    /// Metadata table path, overriding `catalog.data_path`.
    pub data: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Load the catalog and upload it into the remote vector collection.
///
/// The store is injected so the same handler drives both the real Qdrant
/// client and in-memory stores in tests.
pub async fn handle_ingest(
    config: &VitrinaConfig,
    store: Arc<dyn VectorStore>,
    options: IngestOptions,
) -> Result<()> {
    let features_path = options
        .features
        .as_deref()
        .unwrap_or(&config.catalog.features_path);
    let data_path = options.data.as_deref().unwrap_or(&config.catalog.data_path);

    let catalog = Catalog::load(features_path, data_path)?;
    println!(
        "Loaded catalog: {} items, dimension {}",
        catalog.len(),
        catalog.dimension()
    );

    let ingester = CollectionIngester::new(store, config.vector.clone());
    let report = ingester.ingest(&catalog).await?;

    println!("Ingestion complete:");
    println!("  Collection: {}", config.vector.collection);
    println!("  Items:      {}", report.total_items);
    println!("  Batches:    {}", report.batches);
    println!("  Batch size: {}", report.batch_size);
    println!("  Duration:   {} ms", report.duration_ms);

    Ok(())
}

/// Build or inspect the persisted local flat index.
pub async fn handle_index(config: &VitrinaConfig, force: bool, check: bool) -> Result<()> {
    let path = configured_index_path(config)?;

    if check {
        if index_exists(path) {
            let index = FlatIndex::load(path)?;
            println!(
                "Index present at {path}: {} vectors, dimension {}",
                index.len(),
                index.dimension()
            );
        } else {
            println!("No index at {path}.");
        }
        return Ok(());
    }

    if index_exists(path) && !force {
        println!("Index already exists at {path} — use --force to rebuild.");
        return Ok(());
    }

    let timer = OpTimer::start("index build");
    let features = FeatureStore::load(&config.catalog.features_path)?;
    let index = FlatIndex::build(features.dimension(), features.rows())?;
    index.persist(path)?;
    timer.finish_with(format!("{} vectors", index.len()));

    println!(
        "Built index: {} vectors, dimension {}, saved to {path}",
        index.len(),
        index.dimension()
    );
    Ok(())
}

/// Probe every configured backend and report per-service status.
///
/// The local index is informational only; an unreachable remote service
/// makes the whole command fail so scripts can gate on the exit code.
pub async fn handle_health(config: &VitrinaConfig) -> Result<()> {
    let qdrant = QdrantClient::from_config(&config.vector)?;
    let elastic = ElasticBackend::from_config(&config.text)?;
    let mut down = 0usize;

    println!("Service health:");
    match qdrant.health().await {
        Ok(()) => println!("  qdrant ({}): ok", qdrant.base_url()),
        Err(e) => {
            down += 1;
            println!("  qdrant ({}): unreachable ({e})", qdrant.base_url());
        }
    }
    match elastic.health().await {
        Ok(()) => println!("  elasticsearch ({}): ok", elastic.base_url()),
        Err(e) => {
            down += 1;
            println!("  elasticsearch ({}): unreachable ({e})", elastic.base_url());
        }
    }
    match config.vector.index_path.as_deref() {
        Some(path) if index_exists(path) => println!("  local index ({path}): present"),
        Some(path) => println!("  local index ({path}): absent"),
        None => println!("  local index: not configured"),
    }

    if down > 0 {
        return Err(Error::backend(format!(
            "{down} of 2 remote services unreachable"
        )));
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// The configured index path, required for index commands.
fn configured_index_path(config: &VitrinaConfig) -> Result<&str> {
    config
        .vector
        .index_path
        .as_deref()
        .ok_or_else(|| Error::config("vector.index_path is not set — set it to use the local index"))
}

// ============================================================================
// Tests
// ============================================================================
