//! Vector search infrastructure for Vitrina.
//!
//! This crate covers both halves of the catalog's vector story: batched
//! ingestion into a remote cosine collection, and a local flat index for
//! exact squared-Euclidean search over the same embeddings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      vitrina-vector                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  VectorStore trait                                          │
//! │  ├── QdrantClient (REST, remote collection)                 │
//! │  └── MemoryVectorStore (in-memory, for tests)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CollectionIngester (ensure + batched idempotent upserts)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FlatIndex (exact local search, temp-then-rename persist)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrina_catalog::Catalog;
//! use vitrina_vector::{CollectionIngester, QdrantClient, VectorConfig};
//!
//! let config = VectorConfig::default();
//! let store = Arc::new(QdrantClient::from_config(&config)?);
//! let ingester = CollectionIngester::new(store, config);
//!
//! let catalog = Catalog::load("features.bin", "data.csv")?;
//! let report = ingester.ingest(&catalog).await?;
//! println!("{} items in {} batches", report.total_items, report.batches);
//! ```

// Core types and the store trait
pub mod store;
pub mod types;

// Remote backend and its in-memory stand-in
pub mod memory;
pub mod qdrant;

// Ingestion pipeline
pub mod ingest;

// Local exact index
pub mod flat;

// Re-exports — core types
pub use types::{CollectionInfo, IndexedPoint, IngestReport, Metric, ScoredHit, VectorConfig};

// Re-exports — stores
pub use memory::MemoryVectorStore;
pub use qdrant::QdrantClient;
pub use store::VectorStore;

// Re-exports — ingestion
pub use ingest::{CollectionIngester, batch_ranges};

// Re-exports — local index
pub use flat::{FlatHit, FlatIndex, index_exists};
