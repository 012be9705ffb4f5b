//! Catalog loading for Vitrina.
//!
//! Turns the two offline input files of an ingestion run into one
//! validated, ordered collection:
//!
//! ```text
//! features.vtrf (f32 matrix)  ┐
//!                             ├── Catalog::load ──> [CatalogEntry]
//! catalog.csv (metadata rows) ┘        (id, vector, record)
//! ```
//!
//! Row counts are checked eagerly at load; the row index becomes the
//! stable id used by both the remote collection and the local index.
//!
//! # Modules
//!
//! - [`record`]: `CatalogRecord`, validated `PointPayload`, `Product`
//! - [`features`]: binary feature-matrix reader/writer
//! - [`table`]: CSV metadata reader
//! - [`catalog`]: the joined, id-keyed catalog

pub mod catalog;
pub mod features;
pub mod record;
pub mod table;

// Re-export key types at crate root for convenience
pub use catalog::{Catalog, CatalogEntry};
pub use features::{FEATURES_MAGIC, FEATURES_VERSION, FeatureStore};
pub use record::{CatalogRecord, PointPayload, Product};
pub use table::CatalogTable;
