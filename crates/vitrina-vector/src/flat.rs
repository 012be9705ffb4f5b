//! Flat exact nearest-neighbor index over squared-Euclidean distance.
//!
//! The local backend for offline operation: every query is compared
//! against every stored vector, so there are no false negatives and no
//! tuning. The catalog is modest, which makes the exhaustive scan cheap
//! and correctness worth more than marginal latency.
//!
//! The index stores vectors only, in insertion order; row `i` is id `i`.
//! Metadata is recovered by re-joining hit ids against the catalog. On
//! disk it is a single headered binary file (`VTRI` magic), written with
//! temp-then-rename so a failed persist never clobbers a previous index.

use std::fs;
use std::path::Path;

use vitrina_core::{Error, Result};

/// Magic bytes identifying a Vitrina flat index file.
pub const INDEX_MAGIC: &[u8; 4] = b"VTRI";

/// Current index file format version.
pub const INDEX_VERSION: u32 = 1;

/// Header size: magic + version (u32) + rows (u64) + dimension (u32).
const HEADER_LEN: usize = 4 + 4 + 8 + 4;

/// Check whether a persisted index is already present.
///
/// A plain file-presence test: callers use it to skip rebuilds and decide
/// when to force one.
pub fn index_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// One local-index hit: row id and squared-Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatHit {
    /// Insertion-order row id.
    pub id: u64,
    /// Squared-Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// Exact nearest-neighbor index over all catalog vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from vectors in id order.
    ///
    /// Every vector must have length `dimension`; a ragged input fails
    /// with the offending row in the message.
    pub fn build<'a>(
        dimension: usize,
        vectors: impl IntoIterator<Item = &'a [f32]>,
    ) -> Result<Self> {
        let mut data = Vec::new();
        let mut rows = 0usize;
        for vector in vectors {
            if vector.len() != dimension {
                return Err(Error::load(format!(
                    "vector {rows} has dimension {}, expected {dimension}",
                    vector.len()
                )));
            }
            data.extend_from_slice(vector);
            rows += 1;
        }
        log::debug!("built flat index: {rows} vectors, dimension {dimension}");
        Ok(Self { dimension, data })
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension every stored vector has.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Exhaustive nearest-neighbor search.
    ///
    /// Returns up to `top_k` hits by ascending distance, ties broken by
    /// ascending id. `top_k = 0` and an empty index both return no hits.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<FlatHit>> {
        if query.len() != self.dimension {
            return Err(Error::config(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<FlatHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, row)| FlatHit {
                id: i as u64,
                distance: squared_euclidean(query, row),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        hits.truncate(top_k);
        Ok(hits)
    }

    /// Write the index durably to `path`.
    ///
    /// Writes a sibling temp file first and renames it into place, so an
    /// interrupted persist leaves any previous index at `path` untouched.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| Error::persist(format!("creating {}: {e}", parent.display())))?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, self.to_bytes())
            .map_err(|e| Error::persist(format!("writing {}: {e}", tmp.display())))?;
        fs::rename(&tmp, path).map_err(|e| {
            Error::persist(format!(
                "renaming {} to {}: {e}",
                tmp.display(),
                path.display()
            ))
        })?;
        log::info!(
            "persisted flat index to {} ({} vectors, dimension {})",
            path.display(),
            self.len(),
            self.dimension
        );
        Ok(())
    }

    /// Load a persisted index from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_bytes_origin(&bytes, &path.display().to_string())
    }

    /// Parse an index file already held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_origin(bytes, "<memory>")
    }

    fn from_bytes_origin(bytes: &[u8], origin: &str) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::load(format!(
                "{origin}: truncated header ({} bytes, need {HEADER_LEN})",
                bytes.len()
            )));
        }
        if &bytes[0..4] != INDEX_MAGIC {
            return Err(Error::load(format!(
                "{origin}: bad magic, not a flat index file"
            )));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != INDEX_VERSION {
            return Err(Error::load(format!(
                "{origin}: unsupported format version {version} (expected {INDEX_VERSION})"
            )));
        }
        let rows = u64::from_le_bytes([
            bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
        ]) as usize;
        let dimension = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]) as usize;
        if rows > 0 && dimension == 0 {
            return Err(Error::load(format!("{origin}: dimension 0 with {rows} rows")));
        }

        let expected = rows
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::load(format!("{origin}: header overflows address space")))?;
        let body = &bytes[HEADER_LEN..];
        if body.len() != expected {
            return Err(Error::load(format!(
                "{origin}: body is {} bytes, header promises {expected} ({rows} rows x {dimension} dims)",
                body.len()
            )));
        }

        let data = body
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { dimension, data })
    }

    /// Encode the index in the on-disk format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(&INDEX_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }
}

fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
