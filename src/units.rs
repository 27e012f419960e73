//! Metric to imperial size mirrors
//!
//! Every millimeter dimension on an item gets an inch counterpart:
//! `round(mm / 25.4, 3)`, applied per axis and per loft level. Only numbers
//! are converted: a mistyped axis stays as written, and polygon footprints
//! are not converted yet and pass through unchanged.

use serde_json::{Number, Value};

use crate::item::{Size, SourceItem};

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Box keys measured in millimeters
const LENGTH_KEYS: [&str; 4] = ["x", "y", "z", "corner_radius"];

/// Convert millimeters to inches, rounded to 3 decimal places
pub fn to_inches(mm: f64) -> f64 {
    (mm / MM_PER_INCH * 1000.0).round() / 1000.0
}

/// Replace a numeric value with its inch equivalent; anything else stays
fn convert_length(value: &mut Value) {
    if let Some(inches) = value.as_f64().map(to_inches).and_then(Number::from_f64) {
        *value = Value::Number(inches);
    }
}

impl Size {
    /// Inch mirror of this size. The result owns all of its data.
    pub fn to_imperial(&self) -> Size {
        let mut mirror = self.clone();
        if let Some(fields) = mirror.value_mut().as_object_mut() {
            for key in LENGTH_KEYS {
                if let Some(value) = fields.get_mut(key) {
                    convert_length(value);
                }
            }
            if let Some(levels) = fields.get_mut("levels").and_then(Value::as_array_mut) {
                for z in levels.iter_mut().filter_map(|level| level.get_mut("z")) {
                    convert_length(z);
                }
            }
        }
        mirror
    }
}

/// Inch mirror of an optional size; no size gives no mirror
pub fn to_imperial(size: Option<&Size>) -> Option<Size> {
    size.map(Size::to_imperial)
}

/// A source item together with its imperial size mirrors
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedItem {
    pub source: SourceItem,
    pub inner_size_in: Option<Size>,
    pub outer_size_in: Option<Size>,
}

impl EnrichedItem {
    pub fn new(source: SourceItem) -> Self {
        let inner_size_in = to_imperial(source.inner_size.as_ref());
        let outer_size_in = to_imperial(source.outer_size.as_ref());
        Self {
            source,
            inner_size_in,
            outer_size_in,
        }
    }

    pub fn id(&self) -> &str {
        &self.source.id
    }
}

/// Attach imperial mirrors to every item, keeping order
pub fn enrich(items: Vec<SourceItem>) -> Vec<EnrichedItem> {
    items.into_iter().map(EnrichedItem::new).collect()
}
