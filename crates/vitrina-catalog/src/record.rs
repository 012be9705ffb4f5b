//! Catalog row, ingestion payload, and the unified `Product` result model.
//!
//! `CatalogRecord` is one row of the metadata table as read from disk.
//! `PointPayload` is what actually gets attached to a vector in the remote
//! collection: the record plus the derived `sale_rate`, built only through
//! the validated [`PointPayload::from_record`] constructor. `Product` is
//! the single result shape every query backend maps into.

use serde::{Deserialize, Serialize};
use vitrina_core::{Error, Result};

// ============================================================================
// CatalogRecord
// ============================================================================

/// One row of the catalog metadata table.
///
/// The row index in the table is the record's id; it is assigned at load
/// time (see `Catalog::load`) and is stable across ingestion runs over the
/// same input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Catalog-relative path of the item page.
    pub item_path: String,
    /// URL or path of the item's image.
    pub item_image: String,
    /// Display name of the item.
    pub item_name: String,
    /// Undiscounted price in minor units.
    pub fixed_item_price: u64,
    /// Current sale price in minor units.
    pub sale_item_price: u64,
    /// Number of recorded sales.
    pub sales_number: u64,
    /// Catalog-relative path of the shop page.
    pub shop_path: String,
    /// Display name of the shop.
    pub shop_name: String,
}

// ============================================================================
// PointPayload
// ============================================================================

/// Payload attached to one vector in the remote collection.
///
/// Serializes flat: the record's fields plus `sale_rate` at the top level,
/// which is also the document shape the text-search backend indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    /// The catalog record the payload was derived from.
    #[serde(flatten)]
    pub record: CatalogRecord,
    /// Discount fraction: `1 - sale_item_price / fixed_item_price`.
    pub sale_rate: f64,
}

impl PointPayload {
    /// Build a payload from a record, deriving `sale_rate`.
    ///
    /// Fails when `fixed_item_price` is zero: the rate is undefined there
    /// and the row must not be ingested. The row id is included in the
    /// error so the offending input line can be found.
    pub fn from_record(id: u64, record: &CatalogRecord) -> Result<Self> {
        if record.fixed_item_price == 0 {
            return Err(Error::invalid_record(format!(
                "fixed_item_price is 0 for row {id} ({:?}); sale_rate is undefined",
                record.item_name
            )));
        }
        let sale_rate = 1.0 - record.sale_item_price as f64 / record.fixed_item_price as f64;
        Ok(Self {
            record: record.clone(),
            sale_rate,
        })
    }
}

// ============================================================================
// Product
// ============================================================================

/// Unified query-result shape.
///
/// Constructed identically whether the hit came from the vector backend
/// (payload) or the text backend (source document), so callers never see
/// backend-native shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Display name of the item.
    pub item_name: String,
    /// Catalog-relative path of the item page.
    pub item_path: String,
    /// URL or path of the item's image.
    pub item_image: String,
    /// Undiscounted price in minor units.
    pub fixed_item_price: u64,
    /// Current sale price in minor units.
    pub sale_item_price: u64,
    /// Discount fraction derived at ingestion time.
    pub sale_rate: f64,
    /// Number of recorded sales.
    pub sales_number: u64,
    /// Catalog-relative path of the shop page.
    pub shop_path: String,
    /// Display name of the shop.
    pub shop_name: String,
}

impl From<PointPayload> for Product {
    fn from(payload: PointPayload) -> Self {
        let PointPayload { record, sale_rate } = payload;
        Self {
            item_name: record.item_name,
            item_path: record.item_path,
            item_image: record.item_image,
            fixed_item_price: record.fixed_item_price,
            sale_item_price: record.sale_item_price,
            sale_rate,
            sales_number: record.sales_number,
            shop_path: record.shop_path,
            shop_name: record.shop_name,
        }
    }
}
