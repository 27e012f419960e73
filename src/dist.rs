//! Distribution artifact model
//!
//! What downstream consumers read. Field order here is the order written to
//! disk, and absent values are written as `null` rather than omitted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checksum::Checksum;
use crate::item::{ItemType, Size, Visibility};
use crate::units::EnrichedItem;

/// Default artifact format version
pub const FORMAT_VERSION: &str = "1.0.0";

/// Directory (relative to the dist root) holding per-item files
pub const ITEMS_DIR: &str = "items";

/// Format a generation timestamp the way all envelopes carry it
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Relative path of an item's distribution file
pub fn item_path(id: &str) -> String {
    format!("{}/{}.json", ITEMS_DIR, id)
}

/// Consumer-facing projection of a source item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub origin: Option<Value>,
    pub inner_size_mm: Option<Size>,
    pub inner_size_in: Option<Size>,
    pub outer_size_mm: Option<Size>,
    pub outer_size_in: Option<Size>,
    pub visibility: Option<Vec<Visibility>>,
    pub materials: Option<Value>,
    pub features: Option<Value>,
    pub parts: Option<Value>,
    pub referenced_by_count: u32,
    pub added_by: Option<Value>,
    pub status: Option<Value>,
    pub accuracy: Option<Value>,
    pub identifiers: Option<Value>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub replaced_by: Option<String>,
}

impl DistItem {
    pub fn new(item: EnrichedItem, referenced_by_count: u32) -> Self {
        let EnrichedItem {
            source,
            inner_size_in,
            outer_size_in,
        } = item;
        Self {
            id: source.id,
            item_type: source.item_type,
            name: source.name,
            brand: source.brand,
            origin: source.origin,
            inner_size_mm: source.inner_size,
            inner_size_in,
            outer_size_mm: source.outer_size,
            outer_size_in,
            visibility: source.visibility,
            materials: source.materials,
            features: source.features,
            parts: source.parts,
            referenced_by_count,
            added_by: source.added_by,
            status: source.status,
            accuracy: source.accuracy,
            identifiers: source.identifiers,
            deprecated: source.deprecated,
            replaced_by: source.replaced_by,
        }
    }
}

/// Lightweight index entry pointing at the full item file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub visibility: Option<Vec<Visibility>>,
    pub path: String,
}

impl From<&DistItem> for IndexEntry {
    fn from(item: &DistItem) -> Self {
        Self {
            id: item.id.clone(),
            item_type: item.item_type.clone(),
            name: item.name.clone(),
            brand: item.brand.clone(),
            visibility: item.visibility.clone(),
            path: item_path(&item.id),
        }
    }
}

/// `index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistIndex {
    pub version: String,
    pub generated_at: String,
    pub items: Vec<IndexEntry>,
}

/// `database.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub version: String,
    pub generated_at: String,
    pub items: Vec<DistItem>,
}

/// `meta.json`, for cheap staleness checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    pub generated_at: String,
    pub item_count: usize,
    /// Hash of the database items; unchanged input gives the same hash
    pub content_hash: Checksum,
}
