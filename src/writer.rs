//! Distribution Writer
//!
//! Turns the enriched, counted item set into the published artifacts:
//!
//! ```text
//! dist/
//! ├── meta.json       version, generated_at, item_count, content_hash
//! ├── index.json      lightweight entries pointing at items/
//! ├── database.json   every distribution item
//! └── items/
//!     └── <id>.json   one file per item
//! ```
//!
//! Everything is assembled and checked in memory first. Nothing touches the
//! disk until the index has passed its schema, so a failed build leaves the
//! previous artifacts in place.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::checksum::Checksum;
use crate::dist::{format_timestamp, Database, DistIndex, DistItem, IndexEntry, Meta, ITEMS_DIR};
use crate::error::{CatalogError, Result};
use crate::references::ReferenceReport;
use crate::schema::{SchemaKind, SchemaRegistry, ValidationIssue};
use crate::units::EnrichedItem;

/// JSON layout of written files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Two-space indented
    #[default]
    Pretty,
    Compact,
}

/// How artifacts are written
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub output_format: OutputFormat,
    /// Remove item files whose id is no longer in the catalog
    pub prune_stale: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            prune_stale: true,
        }
    }
}

/// All artifacts of one build, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub database: Database,
    pub index: DistIndex,
    pub meta: Meta,
}

impl Distribution {
    pub fn items(&self) -> &[DistItem] {
        &self.database.items
    }
}

/// A distribution item that failed its schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIssue {
    pub id: String,
    pub errors: Vec<ValidationIssue>,
}

/// Paths written by [`persist`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub meta: PathBuf,
    pub index: PathBuf,
    pub database: PathBuf,
    pub items: Vec<PathBuf>,
    /// Stale item files that were removed
    pub pruned: Vec<PathBuf>,
}

/// Build every artifact from the enriched items and their reference counts
pub fn assemble(
    items: Vec<EnrichedItem>,
    references: &ReferenceReport,
    version: &str,
    generated_at: &DateTime<Utc>,
) -> Result<Distribution> {
    let generated_at = format_timestamp(generated_at);

    let dist_items: Vec<DistItem> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| DistItem::new(item, references.count_for(i)))
        .collect();

    let index = DistIndex {
        version: version.to_string(),
        generated_at: generated_at.clone(),
        items: dist_items.iter().map(IndexEntry::from).collect(),
    };

    let meta = Meta {
        version: version.to_string(),
        generated_at: generated_at.clone(),
        item_count: dist_items.len(),
        content_hash: Checksum::of_json(&dist_items)?,
    };

    let database = Database {
        version: version.to_string(),
        generated_at,
        items: dist_items,
    };

    Ok(Distribution { database, index, meta })
}

/// Check the assembled artifacts against their schemas.
///
/// Item failures are returned and logged; the items are still published.
/// An index failure is fatal.
pub fn check(dist: &Distribution, registry: &SchemaRegistry) -> Result<Vec<ItemIssue>> {
    let mut issues = Vec::new();
    for item in dist.items() {
        let report = registry.validate(&serde_json::to_value(item)?, SchemaKind::DistItem);
        if !report.valid {
            warn!(id = %item.id, errors = ?report.messages(), "dist item validation failed");
            issues.push(ItemIssue {
                id: item.id.clone(),
                errors: report.errors,
            });
        }
    }

    let report = registry.validate(&serde_json::to_value(&dist.index)?, SchemaKind::DistIndex);
    if !report.valid {
        return Err(CatalogError::IndexInvalid {
            errors: report.messages(),
        });
    }

    Ok(issues)
}

/// Write every artifact under `dist_dir`, overwriting what is there
pub fn persist(dist: &Distribution, dist_dir: &Path, options: &WriteOptions) -> Result<WrittenArtifacts> {
    let items_dir = dist_dir.join(ITEMS_DIR);
    fs::create_dir_all(&items_dir)?;

    let mut written = WrittenArtifacts::default();

    for item in dist.items() {
        let path = items_dir.join(format!("{}.json", item.id));
        write_json(&path, item, options.output_format)?;
        written.items.push(path);
    }

    if options.prune_stale {
        written.pruned = prune_stale(&items_dir, dist.items())?;
    }

    written.index = dist_dir.join("index.json");
    write_json(&written.index, &dist.index, options.output_format)?;

    written.database = dist_dir.join("database.json");
    write_json(&written.database, &dist.database, options.output_format)?;

    written.meta = dist_dir.join("meta.json");
    write_json(&written.meta, &dist.meta, options.output_format)?;

    info!(
        items = written.items.len(),
        pruned = written.pruned.len(),
        dir = %dist_dir.display(),
        "wrote distribution"
    );
    Ok(written)
}

fn write_json<T: Serialize>(path: &Path, value: &T, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    fs::write(path, content)?;
    Ok(())
}

fn prune_stale(items_dir: &Path, items: &[DistItem]) -> Result<Vec<PathBuf>> {
    let current: HashSet<String> = items.iter().map(|i| format!("{}.json", i.id)).collect();
    let mut pruned = Vec::new();

    for entry in fs::read_dir(items_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !current.contains(name) {
            fs::remove_file(&path)?;
            pruned.push(path);
        }
    }

    pruned.sort();
    Ok(pruned)
}
