//! Metadata table loading.
//!
//! The catalog table is a headered CSV with one `CatalogRecord` per row;
//! row order defines the id space shared with the feature matrix. Rows are
//! deserialized by header name, so column order in the file is free.

use std::path::Path;

use vitrina_core::{Error, Result};

use crate::record::CatalogRecord;

/// All metadata rows, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTable {
    records: Vec<CatalogRecord>,
}

impl CatalogTable {
    /// Load the table from a CSV file.
    ///
    /// Any unreadable file, missing column, or malformed field fails the
    /// load with the row number in the message; nothing is skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| Error::load(format!("{}: {e}", path.display())))?;

        let mut records = Vec::new();
        for (row, result) in reader.deserialize::<CatalogRecord>().enumerate() {
            let record =
                result.map_err(|e| Error::load(format!("{}: row {row}: {e}", path.display())))?;
            records.push(record);
        }
        log::debug!("loaded {} catalog rows from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// Build a table from already-parsed records (fixtures, tests).
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow row `i`, if present.
    pub fn get(&self, i: usize) -> Option<&CatalogRecord> {
        self.records.get(i)
    }

    /// Borrow all rows in file order.
    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// Consume the table into owned rows in file order.
    pub fn into_records(self) -> Vec<CatalogRecord> {
        self.records
    }
}
