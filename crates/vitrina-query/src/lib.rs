//! Query routing for Vitrina.
//!
//! One router, four routes: raw-vector and image queries against the
//! remote collection, exact queries against the local flat index, and
//! text match plus autocomplete against the full-text backend. All
//! routes produce the same unified [`Product`] list; none falls back to
//! another when its backend fails.
//!
//! [`Product`]: vitrina_catalog::Product

pub mod embed;
pub mod request;
pub mod router;

// Re-exports — router
pub use router::QueryRouter;

// Re-exports — request model
pub use request::{QueryConfig, SearchQuery, SearchRequest};

// Re-exports — embedding
pub use embed::{ImageEmbedder, MockImageEmbedder};
