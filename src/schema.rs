//! Schema Registry
//!
//! Composes the catalog's structural schemas into one validation engine:
//!
//! ```text
//! schema/
//! ├── common.schema.json      shared definitions, referenced by the others
//! ├── item.schema.json        authored source items
//! ├── dist-item.schema.json   per-item distribution records
//! └── dist-index.schema.json  the distribution index
//! ```
//!
//! The common schema is registered under its `$id` so the `$ref`s in the
//! other schemas resolve without any network access. Compilation is pinned
//! to Draft 7.

use std::fmt;
use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use jsonschema::{Draft, JSONSchema};
use serde::Serialize;
use serde_json::Value;

use crate::error::{CatalogError, Result};

static EMBEDDED_SCHEMAS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/schema");

const COMMON_SCHEMA: &str = "common.schema.json";

/// The documents a registry can check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Authored source item
    Item,
    /// Distribution item
    DistItem,
    /// Distribution index
    DistIndex,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 3] = [SchemaKind::Item, SchemaKind::DistItem, SchemaKind::DistIndex];

    /// File name of the schema for this kind
    pub fn file_name(&self) -> &'static str {
        match self {
            SchemaKind::Item => "item.schema.json",
            SchemaKind::DistItem => "dist-item.schema.json",
            SchemaKind::DistIndex => "dist-index.schema.json",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaKind::Item => "item",
            SchemaKind::DistItem => "dist item",
            SchemaKind::DistIndex => "dist index",
        };
        write!(f, "{}", name)
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// JSON pointer into the checked document ("" for the root)
    pub pointer: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer.is_empty() {
            write!(f, "/ {}", self.message)
        } else {
            write!(f, "{} {}", self.pointer, self.message)
        }
    }
}

/// Outcome of validating one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// One line per issue, for log output
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Compiled validators for every [`SchemaKind`]
pub struct SchemaRegistry {
    item: JSONSchema,
    dist_item: JSONSchema,
    dist_index: JSONSchema,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry").finish_non_exhaustive()
    }
}

impl SchemaRegistry {
    /// Load the schemas from a directory on disk
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::from_loader(|name| {
            let path = dir.join(name);
            let content = fs::read_to_string(&path).map_err(|e| CatalogError::SchemaLoad {
                name: name.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })?;
            parse_schema(name, &content)
        })
    }

    /// Load the schemas compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_loader(|name| {
            let content = EMBEDDED_SCHEMAS
                .get_file(name)
                .and_then(|f| f.contents_utf8())
                .ok_or_else(|| CatalogError::SchemaLoad {
                    name: name.to_string(),
                    reason: "not embedded".to_string(),
                })?;
            parse_schema(name, content)
        })
    }

    /// Use `dir` when it exists, the embedded copies otherwise
    pub fn from_dir_or_embedded(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if dir.is_dir() {
            Self::from_dir(dir)
        } else {
            tracing::debug!(dir = %dir.display(), "schema directory not found, using embedded schemas");
            Self::embedded()
        }
    }

    fn from_loader(load: impl Fn(&str) -> Result<Value>) -> Result<Self> {
        let common = load(COMMON_SCHEMA)?;
        let common_id = common
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CatalogError::SchemaLoad {
                name: COMMON_SCHEMA.to_string(),
                reason: "missing $id".to_string(),
            })?;

        let compile = |kind: SchemaKind| -> Result<JSONSchema> {
            let schema = load(kind.file_name())?;
            let compiled = JSONSchema::options()
                .with_draft(Draft::Draft7)
                .with_document(common_id.clone(), common.clone())
                .compile(&schema)
                .map_err(|e| CatalogError::SchemaCompile {
                    name: kind.file_name().to_string(),
                    reason: e.to_string(),
                })?;
            Ok(compiled)
        };

        Ok(Self {
            item: compile(SchemaKind::Item)?,
            dist_item: compile(SchemaKind::DistItem)?,
            dist_index: compile(SchemaKind::DistIndex)?,
        })
    }

    /// Validate `document` against the schema for `kind`
    pub fn validate(&self, document: &Value, kind: SchemaKind) -> ValidationReport {
        let compiled = match kind {
            SchemaKind::Item => &self.item,
            SchemaKind::DistItem => &self.dist_item,
            SchemaKind::DistIndex => &self.dist_index,
        };

        match compiled.validate(document) {
            Ok(()) => ValidationReport {
                valid: true,
                errors: Vec::new(),
            },
            Err(errors) => ValidationReport {
                valid: false,
                errors: errors
                    .map(|e| ValidationIssue {
                        pointer: e.instance_path.to_string(),
                        message: e.to_string(),
                    })
                    .collect(),
            },
        }
    }
}

fn parse_schema(name: &str, content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| CatalogError::SchemaLoad {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
