//! Image embedding trait and mock implementation.
//!
//! The router never reads image bytes itself; it hands them to an
//! [`ImageEmbedder`] and searches with the returned vector. Production
//! deployments plug in a model-serving client here. The mock derives a
//! deterministic unit vector from the bytes so image queries can be
//! tested end to end without a model.

use async_trait::async_trait;
use vitrina_core::Result;

/// Turns raw image bytes into an embedding vector.
///
/// Implementations must be `Send + Sync` so the router can be shared
/// across tasks.
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Embed one image.
    ///
    /// The returned vector must have [`dimension`](Self::dimension)
    /// components; the router passes it to the vector backend unchanged.
    async fn embed(&self, image: &[u8]) -> Result<Vec<f32>>;

    /// The embedding dimension.
    fn dimension(&self) -> usize;

    /// The embedder name for diagnostics.
    fn name(&self) -> &str;
}

/// A mock embedder for testing.
///
/// Generates deterministic vectors from the image bytes: the same bytes
/// always embed to the same unit vector, different bytes almost always
/// differ.
pub struct MockImageEmbedder {
    dimension: usize,
}

impl MockImageEmbedder {
    /// Create a new mock embedder with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn deterministic_embedding(&self, image: &[u8]) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for (i, val) in embedding.iter_mut().enumerate() {
            let byte_idx = i % image.len().max(1);
            let byte_val = if image.is_empty() { 0u8 } else { image[byte_idx] };
            *val = ((byte_val as f32 + i as f32) % 256.0) / 256.0;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut embedding {
                *val /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl ImageEmbedder for MockImageEmbedder {
    async fn embed(&self, image: &[u8]) -> Result<Vec<f32>> {
        Ok(self.deterministic_embedding(image))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}
