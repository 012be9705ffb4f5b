//! Full-text search for Vitrina.
//!
//! Catalog documents are indexed flat (the ingest payload shape), so a
//! hit's source maps directly onto the unified [`Product`] model. The
//! [`TextBackend`] trait keeps the query layer independent of the
//! concrete service: [`ElasticBackend`] speaks the REST API, while
//! [`MockTextBackend`] serves canned products for tests.
//!
//! [`Product`]: vitrina_catalog::Product

pub mod backend;
pub mod elastic;
pub mod mock;
pub mod types;

// Re-exports — trait and backends
pub use backend::TextBackend;
pub use elastic::ElasticBackend;
pub use mock::MockTextBackend;

// Re-exports — configuration
pub use types::TextConfig;
