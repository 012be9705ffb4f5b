//! Text backend abstraction.

use async_trait::async_trait;
use vitrina_catalog::Product;
use vitrina_core::Result;

/// A full-text search backend over catalog documents.
///
/// Both operations rank by the backend's own relevance scoring and
/// return at most `limit` products; fewer (or none) is a valid outcome,
/// not an error.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Full-text match against item names.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>>;

    /// Prefix completion against item names, for search-as-you-type.
    async fn complete(&self, prefix: &str, limit: usize) -> Result<Vec<Product>>;

    /// Short backend name used in error context and logs.
    fn name(&self) -> &str;
}
