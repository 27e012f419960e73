//! Source item model
//!
//! The typed view of an authored catalog document. Sources are validated
//! against `item.schema.json` before they reach this model, but a failed
//! validation does not stop the build, so conversion from JSON is lenient.
//! Only the fields the index is built from are typed; a mistyped one is
//! dropped with a warning. Sizes, parts and provenance are kept as authored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

/// Kind of storage item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Container,
    Drawer,
    Tray,
    Furniture,
    Component,
    Other,
    /// A type string outside the known set, carried through verbatim
    #[serde(untagged)]
    Unrecognized(String),
}

/// Index scopes an item is listed under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Main commercial unit
    Product,
    /// Can be bought or used on its own
    Standalone,
    /// Internal part or sub-component
    Component,
    #[serde(untagged)]
    Unrecognized(String),
}

/// A composition edge read from one `parts` entry: the containing item
/// holds `qty` of `target`. Only `target` takes part in counting; `qty` is
/// whatever the author wrote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part<'a> {
    pub target: &'a str,
    pub qty: Option<&'a Value>,
}

/// Size specification of an item, kept exactly as authored.
///
/// A plain box carries `x`, `y`, `z` and an optional `corner_radius`; a
/// loft adds a `levels` array whose entries carry a `z` and a polygon.
/// Values that fit neither shape are still carried through, so the
/// millimeter view written to the distribution is the authored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(Value);

impl Size {
    pub fn new(value: Value) -> Self {
        Size(value)
    }

    /// Plain box size in millimeters
    pub fn boxed(x: f64, y: f64, z: f64) -> Self {
        Size(json!({"x": x, "y": y, "z": z}))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub(crate) fn value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    /// Numeric value of a box axis (`x`, `y`, `z`, `corner_radius`)
    pub fn axis(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Loft levels; empty for a plain box
    pub fn levels(&self) -> &[Value] {
        self.0
            .get("levels")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_loft(&self) -> bool {
        self.0.get("levels").map_or(false, Value::is_array)
    }
}

/// Authored catalog record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceItem {
    pub id: String,
    pub item_type: Option<ItemType>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub origin: Option<Value>,
    pub visibility: Option<Vec<Visibility>>,
    pub inner_size: Option<Size>,
    pub outer_size: Option<Size>,
    pub materials: Option<Value>,
    pub features: Option<Value>,
    /// `parts` as authored; `SourceItem::parts()` yields the edges
    pub parts: Option<Value>,
    pub added_by: Option<Value>,
    pub status: Option<Value>,
    pub accuracy: Option<Value>,
    pub identifiers: Option<Value>,
    pub deprecated: bool,
    pub replaced_by: Option<String>,
}

impl SourceItem {
    /// Build the typed view of a prepared document.
    ///
    /// `id` is the resolved identifier (explicit or derived). Fields the
    /// index is built from are typed, and a mistyped one is logged and left
    /// empty. Everything else is carried as authored.
    pub fn from_document(id: impl Into<String>, doc: &Value) -> Self {
        let id = id.into();
        let parts = raw(doc, "parts");
        if let Some(parts) = &parts {
            check_parts(&id, parts);
        }
        Self {
            item_type: field(&id, doc, "type"),
            name: field(&id, doc, "name"),
            brand: field(&id, doc, "brand"),
            origin: raw(doc, "origin"),
            visibility: field(&id, doc, "visibility"),
            inner_size: raw(doc, "inner_size").map(Size::new),
            outer_size: raw(doc, "outer_size").map(Size::new),
            materials: raw(doc, "materials"),
            features: raw(doc, "features"),
            parts,
            added_by: raw(doc, "added_by"),
            status: raw(doc, "status"),
            accuracy: raw(doc, "accuracy"),
            identifiers: raw(doc, "identifiers"),
            deprecated: field(&id, doc, "deprecated").unwrap_or(false),
            replaced_by: field(&id, doc, "replaced_by"),
            id,
        }
    }

    /// Every part entry with a string `ref`, in authored order
    pub fn parts(&self) -> impl Iterator<Item = Part<'_>> + '_ {
        self.parts
            .iter()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|entry| {
                Some(Part {
                    target: entry.get("ref")?.as_str()?,
                    qty: entry.get("qty"),
                })
            })
    }
}

fn raw(doc: &Value, key: &str) -> Option<Value> {
    doc.get(key).filter(|v| !v.is_null()).cloned()
}

fn check_parts(id: &str, parts: &Value) {
    match parts.as_array() {
        Some(entries) => {
            for (index, entry) in entries.iter().enumerate() {
                if entry.get("ref").and_then(Value::as_str).is_none() {
                    warn!(id, index, "part entry has no string ref, not counting it");
                }
            }
        }
        None => warn!(id, "parts is not an array, not counting any of it"),
    }
}

fn field<T: DeserializeOwned>(id: &str, doc: &Value, key: &str) -> Option<T> {
    let value = doc.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(id, field = key, error = %e, "field has unexpected shape, ignoring it");
            None
        }
    }
}
