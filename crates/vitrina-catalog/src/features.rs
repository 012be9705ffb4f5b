//! Feature matrix loading.
//!
//! The embedding matrix is stored as a small headered little-endian binary
//! file: `VTRF` magic, format version, row count, dimension, then
//! `rows * dimension` f32 values in row-major order. The loader validates
//! the header and the byte length eagerly so a truncated or foreign file
//! fails at load, not mid-ingestion.

use std::fs;
use std::path::Path;

use vitrina_core::{Error, Result};

/// Magic bytes identifying a Vitrina feature file.
pub const FEATURES_MAGIC: &[u8; 4] = b"VTRF";

/// Current feature file format version.
pub const FEATURES_VERSION: u32 = 1;

/// Header size: magic + version (u32) + rows (u64) + dimension (u32).
const HEADER_LEN: usize = 4 + 4 + 8 + 4;

/// In-memory embedding matrix, row-major, uniform dimension.
///
/// Row `i` holds the embedding for catalog row `i`; the store itself knows
/// nothing about the metadata table beyond sharing that index space.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStore {
    dimension: usize,
    data: Vec<f32>,
}

impl FeatureStore {
    /// Build a store from owned rows, validating uniform dimension.
    ///
    /// The dimension is taken from the first row; any row of a different
    /// length fails with a load error naming the offending row.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(Error::load(format!(
                    "feature row {i} has dimension {}, expected {dimension}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { dimension, data })
    }

    /// Load a feature file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::parse(&bytes, &path.display().to_string())
    }

    /// Parse a feature file already held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(bytes, "<memory>")
    }

    fn parse(bytes: &[u8], origin: &str) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::load(format!(
                "{origin}: truncated header ({} bytes, need {HEADER_LEN})",
                bytes.len()
            )));
        }
        if &bytes[0..4] != FEATURES_MAGIC {
            return Err(Error::load(format!(
                "{origin}: bad magic, not a feature file"
            )));
        }
        let version = read_u32(bytes, 4);
        if version != FEATURES_VERSION {
            return Err(Error::load(format!(
                "{origin}: unsupported format version {version} (expected {FEATURES_VERSION})"
            )));
        }
        let rows = read_u64(bytes, 8) as usize;
        let dimension = read_u32(bytes, 16) as usize;
        if rows > 0 && dimension == 0 {
            return Err(Error::load(format!(
                "{origin}: dimension 0 with {rows} rows"
            )));
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

    /// Write the store to disk in the feature file format.
    ///
    /// Used by fixture generation and export tooling; ingestion itself
    /// only reads.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()).map_err(|e| Error::io_with_path(e, path))
    }

    /// Encode the store in the feature file format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(FEATURES_MAGIC);
        bytes.extend_from_slice(&FEATURES_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension shared by every row.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Borrow row `i`, if present.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.len() {
            return None;
        }
        let start = i * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Iterate over all rows in index order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension.max(1))
    }

    /// Consume the store into owned rows in index order.
    pub fn into_rows(self) -> Vec<Vec<f32>> {
        if self.dimension == 0 {
            return Vec::new();
        }
        self.data
            .chunks_exact(self.dimension)
            .map(|row| row.to_vec())
            .collect()
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_store() -> FeatureStore {
        FeatureStore::from_rows(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap()
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    #[test]
    fn test_from_rows_uniform() {
        let store = sample_store();
        assert_eq!(store.len(), 3);
        assert_eq!(store.dimension(), 3);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_from_rows_ragged_rejected() {
        let err = FeatureStore::from_rows(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_from_rows_empty() {
        let store = FeatureStore::from_rows(vec![]).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.dimension(), 0);
    }

    // ------------------------------------------------------------------------
    // Row access
    // ------------------------------------------------------------------------

    #[test]
    fn test_row_access() {
        let store = sample_store();
        assert_eq!(store.row(1), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(store.row(3), None);
    }

    #[test]
    fn test_rows_iterate_in_order() {
        let store = sample_store();
        let rows: Vec<&[f32]> = store.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], &[1.0, 0.0, 0.0][..]);
        assert_eq!(rows[2], &[0.0, 0.0, 1.0][..]);
    }

    #[test]
    fn test_into_rows_preserves_order() {
        let rows = sample_store().into_rows();
        assert_eq!(rows[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(rows[1], vec![0.0, 1.0, 0.0]);
    }

    // ------------------------------------------------------------------------
    // File format
    // ------------------------------------------------------------------------

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("features.vtrf");
        let store = sample_store();
        store.save(&path).unwrap();

        let loaded = FeatureStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FeatureStore::load(dir.path().join("absent.vtrf")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = sample_store().to_bytes();
        bytes[0] = b'X';
        let err = FeatureStore::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut bytes = sample_store().to_bytes();
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
        let err = FeatureStore::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn test_truncated_header_rejected() {
        let err = FeatureStore::from_bytes(&[0u8; 6]).unwrap_err();
        assert!(err.to_string().contains("truncated header"));
    }

    #[test]
    fn test_truncated_body_rejected() {
        let mut bytes = sample_store().to_bytes();
        bytes.truncate(bytes.len() - 4);
        let err = FeatureStore::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("header promises"));
    }

    #[test]
    fn test_empty_store_roundtrip() {
        let store = FeatureStore::from_rows(vec![]).unwrap();
        let loaded = FeatureStore::from_bytes(&store.to_bytes()).unwrap();
        assert!(loaded.is_empty());
    }
}
