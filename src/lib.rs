//! Storage Catalog
//!
//! Compiles a tree of authored storage-item records (bins, drawers, trays,
//! furniture) into the artifacts downstream applications consume.
//!
//! ## Pipeline
//!
//! ```text
//! src/items/**.json ──load──▶ SourceDocument ──validate──▶ SourceItem
//!        ──units──▶ EnrichedItem ──references──▶ counts
//!        ──writer──▶ dist/{meta,index,database}.json + dist/items/<id>.json
//! ```
//!
//! - **Schema Registry** ([`schema`]): item, dist-item and dist-index checks
//! - **Source Loader** ([`loader`]): discovery, parsing, id derivation
//! - **Unit Converter** ([`units`]): inch mirrors of every mm size
//! - **Reference Resolver** ([`references`]): `referenced_by_count`
//! - **Distribution Writer** ([`writer`]): assembly, checks, persistence

pub mod check;
pub mod checksum;
pub mod config;
pub mod dist;
pub mod error;
pub mod item;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod references;
pub mod schema;
pub mod units;
pub mod writer;

pub use checksum::Checksum;
pub use config::CatalogConfig;
pub use dist::{Database, DistIndex, DistItem, IndexEntry, Meta};
pub use error::{CatalogError, Result};
pub use item::{ItemType, Part, Size, SourceItem, Visibility};
pub use pipeline::{build, BuildReport};
pub use schema::{SchemaKind, SchemaRegistry, ValidationReport};
