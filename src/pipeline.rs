//! End-to-end build: load → validate → convert → resolve → check → persist.
//!
//! Each stage hands an owned result to the next one. Fatal conditions
//! (unreadable or malformed sources, duplicate ids, an invalid index) stop
//! the build before anything is written. Schema failures on individual
//! items are collected in the report and the items are published anyway.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::item::SourceItem;
use crate::loader::{self, SourceDocument};
use crate::references::{self, GhostRef};
use crate::schema::{SchemaKind, SchemaRegistry, ValidationIssue};
use crate::units;
use crate::writer::{self, ItemIssue, WrittenArtifacts};

/// A source document that failed `item.schema.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIssue {
    pub path: std::path::PathBuf,
    pub id: String,
    pub errors: Vec<ValidationIssue>,
}

/// Result of a completed build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub item_count: usize,
    pub generated_at: DateTime<Utc>,
    pub source_issues: Vec<SourceIssue>,
    pub dist_issues: Vec<ItemIssue>,
    pub ghosts: Vec<GhostRef>,
    pub cycles: Vec<Vec<String>>,
    pub written: WrittenArtifacts,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Whether every source and distribution item passed its schema
    pub fn is_clean(&self) -> bool {
        self.source_issues.is_empty() && self.dist_issues.is_empty()
    }
}

/// Validate each prepared source document. Failures are reported, not fatal.
pub fn validate_sources(docs: &[SourceDocument], registry: &SchemaRegistry) -> Vec<SourceIssue> {
    docs.iter()
        .filter_map(|doc| {
            let report = registry.validate(&doc.document, SchemaKind::Item);
            if report.valid {
                return None;
            }
            warn!(path = %doc.path.display(), errors = ?report.messages(), "validation failed");
            Some(SourceIssue {
                path: doc.path.clone(),
                id: doc.id.clone(),
                errors: report.errors,
            })
        })
        .collect()
}

/// Run a full build with the given config and schemas
#[instrument(skip_all, fields(root = %config.paths.content_root.display()))]
pub fn build(config: &CatalogConfig, registry: &SchemaRegistry, generated_at: DateTime<Utc>) -> Result<BuildReport> {
    let start = Instant::now();
    config.validate()?;

    let docs = loader::load_catalog(&config.paths.content_root, &config.load_options())?;
    loader::check_identifiers(&docs)?;

    let source_issues = validate_sources(&docs, registry);

    let sources: Vec<SourceItem> = docs
        .iter()
        .map(|doc| SourceItem::from_document(doc.id.as_str(), &doc.document))
        .collect();

    let enriched = units::enrich(sources);
    let refs = references::resolve(&enriched);
    info!(
        items = enriched.len(),
        ghosts = refs.ghosts.len(),
        cycles = refs.cycles.len(),
        "resolved part references"
    );

    let dist = writer::assemble(enriched, &refs, &config.build.format_version, &generated_at)?;
    let dist_issues = writer::check(&dist, registry)?;
    let written = writer::persist(&dist, &config.paths.dist_dir, &config.write_options())?;

    Ok(BuildReport {
        item_count: dist.meta.item_count,
        generated_at,
        source_issues,
        dist_issues,
        ghosts: refs.ghosts,
        cycles: refs.cycles,
        written,
        elapsed: start.elapsed(),
    })
}
