//! Source Loading
//!
//! Discovers the authored item documents under the content root, parses
//! them and resolves each item's identifier. Layout:
//!
//! ```text
//! src/items/
//! ├── acme/
//! │   ├── brand.json          brand metadata, not an item
//! │   └── bins/
//! │       └── small.json      -> acme_bins_small
//! └── _examples/              templates, never built
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{CatalogError, Result};

/// Controls which files under the content root are items
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Skip any file with one of these directory names in its path
    pub exclude_dirs: Vec<String>,
    /// Skip files with one of these names
    pub exclude_files: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            exclude_dirs: vec!["_examples".to_string()],
            exclude_files: vec!["brand.json".to_string()],
        }
    }
}

impl LoadOptions {
    /// Whether a path relative to the content root should be skipped
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let file_name = relative.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if self.exclude_files.iter().any(|f| f == file_name) {
            return true;
        }
        relative.parent().into_iter().flat_map(Path::components).any(|c| match c {
            Component::Normal(name) => self.exclude_dirs.iter().any(|d| name == d.as_str()),
            _ => false,
        })
    }
}

/// A parsed source document, ready for validation
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Path relative to the content root
    pub path: PathBuf,
    /// Explicit `id`, or the one derived from `path`
    pub id: String,
    /// Document content with `$schema` removed and `id` filled in
    pub document: Value,
}

/// List item documents under `root` in sorted traversal order
pub fn discover(root: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(CatalogError::MissingRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if options.is_excluded(relative) {
            debug!(path = %relative.display(), "skipping excluded document");
            continue;
        }
        files.push(path.to_path_buf());
    }
    Ok(files)
}

/// Derive an item id from a path relative to the content root.
///
/// `acme/bins/small.json` becomes `acme_bins_small`.
pub fn derive_id(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = segments.last_mut() {
        if let Some(stem) = Path::new(last.as_str()).file_stem() {
            *last = stem.to_string_lossy().into_owned();
        }
    }

    segments.join("_").to_lowercase()
}

/// Explicit, non-empty `id` of a document
pub fn explicit_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Strip authoring-only fields and fill in the id when missing.
///
/// Returns the id the document ends up with.
pub fn prepare_document(doc: &mut Value, derived_id: &str) -> String {
    let Some(obj) = doc.as_object_mut() else {
        return derived_id.to_string();
    };
    obj.remove("$schema");

    match obj.get("id").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            obj.insert("id".to_string(), Value::String(derived_id.to_string()));
            derived_id.to_string()
        }
    }
}

/// Read and parse one document. Any failure here is fatal for a build.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every item document under `root`
pub fn load_catalog(root: &Path, options: &LoadOptions) -> Result<Vec<SourceDocument>> {
    let files = discover(root, options)?;
    tracing::info!(count = files.len(), root = %root.display(), "found item files");

    files
        .into_iter()
        .map(|path| {
            let mut document = read_document(&path)?;
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            let id = prepare_document(&mut document, &derive_id(&relative));
            Ok(SourceDocument {
                path: relative,
                id,
                document,
            })
        })
        .collect()
}

/// Reject identifiers that collide or cannot name an output file
pub fn check_identifiers(docs: &[SourceDocument]) -> Result<()> {
    let mut seen: HashMap<&str, &Path> = HashMap::with_capacity(docs.len());
    for doc in docs {
        if !is_safe_file_stem(&doc.id) {
            return Err(CatalogError::UnsafeId {
                id: doc.id.clone(),
                path: doc.path.clone(),
            });
        }
        if let Some(first) = seen.insert(&doc.id, &doc.path) {
            return Err(CatalogError::DuplicateId {
                id: doc.id.clone(),
                first: first.to_path_buf(),
                second: doc.path.clone(),
            });
        }
    }
    Ok(())
}

fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}
