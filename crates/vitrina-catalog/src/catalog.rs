//! The joined catalog: feature matrix and metadata table zipped by row.
//!
//! The two input files are only related by row position, which is easy to
//! silently get wrong. `Catalog::load` validates the row counts once,
//! eagerly, then fuses both sources into a single ordered collection of
//! `(id, vector, record)` entries so nothing downstream can misalign them.

use std::path::Path;

use vitrina_core::{Error, OpTimer, Result};

use crate::features::FeatureStore;
use crate::record::CatalogRecord;
use crate::table::CatalogTable;

/// One catalog row with its embedding.
///
/// `id` is the row index shared by both input files; it becomes the point
/// id in the remote collection and the implicit position in the local
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Row index, unique and stable for a given pair of input files.
    pub id: u64,
    /// Image-derived embedding for this row.
    pub vector: Vec<f32>,
    /// Metadata for this row.
    pub record: CatalogRecord,
}

/// The full catalog, loaded once per process and read-only afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    dimension: usize,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load and join the feature matrix and the metadata table.
    ///
    /// Fails with a load error if either file is missing or malformed, or
    /// if the row counts disagree. The mismatch check happens here, before
    /// anything is written anywhere, because a misaligned join corrupts
    /// every id-to-payload pairing after it.
    pub fn load(features_path: impl AsRef<Path>, data_path: impl AsRef<Path>) -> Result<Self> {
        let timer = OpTimer::start("catalog load");
        let features = FeatureStore::load(features_path.as_ref())?;
        let table = CatalogTable::load(data_path.as_ref())?;

        if features.len() != table.len() {
            return Err(Error::load(format!(
                "row count mismatch: {} vectors in {}, {} records in {}",
                features.len(),
                features_path.as_ref().display(),
                table.len(),
                data_path.as_ref().display()
            )));
        }

        let dimension = features.dimension();
        let entries = features
            .into_rows()
            .into_iter()
            .zip(table.into_records())
            .enumerate()
            .map(|(i, (vector, record))| CatalogEntry {
                id: i as u64,
                vector,
                record,
            })
            .collect::<Vec<_>>();

        timer.finish_with(format!("{} entries, dimension {dimension}", entries.len()));
        Ok(Self { dimension, entries })
    }

    /// Build a catalog from already-joined entries (fixtures, tests).
    ///
    /// Validates the same laws as `load`: uniform vector dimension and
    /// ids equal to positions.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let dimension = entries.first().map(|e| e.vector.len()).unwrap_or(0);
        for (i, entry) in entries.iter().enumerate() {
            if entry.vector.len() != dimension {
                return Err(Error::load(format!(
                    "entry {i} has dimension {}, expected {dimension}",
                    entry.vector.len()
                )));
            }
            if entry.id != i as u64 {
                return Err(Error::load(format!(
                    "entry {i} carries id {}, ids must equal positions",
                    entry.id
                )));
            }
        }
        Ok(Self { dimension, entries })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension shared by every entry.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Borrow the entry with row id `id`, if present.
    pub fn get(&self, id: u64) -> Option<&CatalogEntry> {
        self.entries.get(id as usize)
    }

    /// Borrow all entries in id order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Iterate over all entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Borrow all vectors in id order (for local index builds).
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.entries.iter().map(|e| e.vector.as_slice())
    }
}
