//! Error types for the catalog build

use std::path::PathBuf;

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog build errors
///
/// Everything in here is fatal for a build run. Recoverable problems
/// (schema failures on individual items, ghost part references) are
/// reported through the build report instead.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Content root not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Error parsing JSON file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate item id '{id}': {} and {}", first.display(), second.display())]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Item id '{id}' from {} cannot be used as a file name", path.display())]
    UnsafeId { id: String, path: PathBuf },

    #[error("Failed to load schema {name}: {reason}")]
    SchemaLoad { name: String, reason: String },

    #[error("Failed to compile schema {name}: {reason}")]
    SchemaCompile { name: String, reason: String },

    #[error("Dist index validation failed:\n{}", .errors.join("\n"))]
    IndexInvalid { errors: Vec<String> },

    #[error("Invalid format version: {0}")]
    InvalidVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
