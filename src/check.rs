//! Per-file source validation
//!
//! The contract behind `catalog-validate`: the same preparation and schema
//! as the build, but every file is checked and a broken one never stops
//! the others.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::loader::{self, LoadOptions};
use crate::schema::{SchemaKind, SchemaRegistry, ValidationIssue};

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Valid,
    Invalid(Vec<ValidationIssue>),
    /// Unreadable or not JSON
    Unparseable(String),
}

/// Checked file with its display path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    /// Path relative to the content root when the file lives under it
    pub display_path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileCheck {
    pub fn is_valid(&self) -> bool {
        self.outcome == FileOutcome::Valid
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckSummary {
    pub files: Vec<FileCheck>,
}

impl CheckSummary {
    pub fn error_count(&self) -> usize {
        self.files.iter().filter(|f| !f.is_valid()).count()
    }

    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }
}

/// Validate specific files as source items
pub fn check_files(registry: &SchemaRegistry, content_root: &Path, paths: &[PathBuf]) -> CheckSummary {
    let files = paths
        .iter()
        .map(|path| {
            let relative = path.strip_prefix(content_root).ok();
            let display_path = relative.unwrap_or(path).to_path_buf();
            let outcome = match loader::read_document(path) {
                Ok(mut doc) => {
                    // Outside the content tree there is no path to derive an id
                    // from, so only an explicit one counts.
                    match relative {
                        Some(rel) => {
                            loader::prepare_document(&mut doc, &loader::derive_id(rel));
                        }
                        None => {
                            if let Some(obj) = doc.as_object_mut() {
                                obj.remove("$schema");
                            }
                        }
                    }
                    let report = registry.validate(&doc, SchemaKind::Item);
                    if report.valid {
                        FileOutcome::Valid
                    } else {
                        FileOutcome::Invalid(report.errors)
                    }
                }
                Err(e) => FileOutcome::Unparseable(e.to_string()),
            };
            FileCheck { display_path, outcome }
        })
        .collect();

    CheckSummary { files }
}

/// Validate every item document under the content root
pub fn check_catalog(registry: &SchemaRegistry, content_root: &Path, options: &LoadOptions) -> Result<CheckSummary> {
    let paths = loader::discover(content_root, options)?;
    Ok(check_files(registry, content_root, &paths))
}
