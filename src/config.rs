//! Configuration management for the catalog build
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (catalog.toml)
//! - Environment variables (CATALOG__*)
//!
//! ## Example config file (catalog.toml):
//! ```toml
//! [paths]
//! content_root = "src/items"
//! schema_dir = "schema"
//! dist_dir = "dist"
//!
//! [loader]
//! exclude_dirs = ["_examples"]
//! exclude_files = ["brand.json"]
//!
//! [build]
//! format_version = "1.0.0"
//! output_format = "pretty"
//! prune_stale = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CatalogError;
use crate::loader::LoadOptions;
use crate::writer::{OutputFormat, WriteOptions};

/// Main configuration for the catalog build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Where sources, schemas and artifacts live
    #[serde(default)]
    pub paths: PathsConfig,

    /// Source discovery settings
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Artifact settings
    #[serde(default)]
    pub build: BuildConfig,
}

/// Directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the authored item tree
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    /// Directory holding the JSON schemas (embedded copies are used when missing)
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Output directory for generated artifacts
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

/// Which files count as items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    #[serde(default = "default_exclude_files")]
    pub exclude_files: Vec<String>,
}

/// Artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Version tag written into every envelope
    #[serde(default = "default_format_version")]
    pub format_version: String,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Delete item files for ids no longer in the catalog
    #[serde(default = "default_true")]
    pub prune_stale: bool,
}

// Default value functions
fn default_content_root() -> PathBuf {
    PathBuf::from("src/items")
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schema")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_exclude_dirs() -> Vec<String> {
    LoadOptions::default().exclude_dirs
}

fn default_exclude_files() -> Vec<String> {
    LoadOptions::default().exclude_files
}

fn default_format_version() -> String {
    crate::dist::FORMAT_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            schema_dir: default_schema_dir(),
            dist_dir: default_dist_dir(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
            exclude_files: default_exclude_files(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            format_version: default_format_version(),
            output_format: OutputFormat::Pretty,
            prune_stale: true,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["catalog.toml", ".catalog.toml", "config/catalog.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "storage-catalog", "catalog") {
            let xdg_config = config_dir.config_dir().join("catalog.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CATALOG__BUILD__OUTPUT_FORMAT=compact etc.
        builder = builder.add_source(
            Environment::with_prefix("CATALOG")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Check values the deserializer cannot
    pub fn validate(&self) -> Result<(), CatalogError> {
        semver::Version::parse(&self.build.format_version)
            .map_err(|e| CatalogError::InvalidVersion(format!("{}: {}", self.build.format_version, e)))?;
        Ok(())
    }

    /// Same config with every path resolved against `base`
    pub fn rooted_at(&self, base: &std::path::Path) -> Self {
        let mut config = self.clone();
        config.paths.content_root = base.join(&self.paths.content_root);
        config.paths.schema_dir = base.join(&self.paths.schema_dir);
        config.paths.dist_dir = base.join(&self.paths.dist_dir);
        config
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            exclude_dirs: self.loader.exclude_dirs.clone(),
            exclude_files: self.loader.exclude_files.clone(),
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            output_format: self.build.output_format,
            prune_stale: self.build.prune_stale,
        }
    }
}
