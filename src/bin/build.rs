//! Catalog Build CLI
//!
//! Compiles the item tree into `dist/`. Takes no flags; paths and output
//! settings come from `catalog.toml` and `CATALOG__*` variables.

use clap::Parser;
use storage_catalog::{build, CatalogConfig, SchemaRegistry};

#[derive(Parser)]
#[command(name = "catalog-build")]
#[command(about = "Build distribution artifacts from the item catalog")]
struct Cli {}

fn main() {
    storage_catalog::logging::init();

    let _cli = Cli::parse();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = CatalogConfig::load()?;
    let registry = SchemaRegistry::from_dir_or_embedded(&config.paths.schema_dir)?;

    let report = build(&config, &registry, chrono::Utc::now())?;

    if !report.source_issues.is_empty() {
        println!("⚠️  {} source item(s) failed validation:", report.source_issues.len());
        for issue in &report.source_issues {
            println!("  ❌ {}", issue.path.display());
            for error in &issue.errors {
                println!("     - {}", error);
            }
        }
        println!();
    }

    if !report.dist_issues.is_empty() {
        println!("⚠️  {} dist item(s) failed validation:", report.dist_issues.len());
        for issue in &report.dist_issues {
            println!("  ❌ {}", issue.id);
            for error in &issue.errors {
                println!("     - {}", error);
            }
        }
        println!();
    }

    let dist = config.paths.dist_dir.display();
    println!("✅ Build complete in {:.2?}. Generated:", report.elapsed);
    println!("  - {}/meta.json (Cache check)", dist);
    println!("  - {}/index.json (Lightweight index, {} items)", dist, report.item_count);
    println!("  - {}/database.json (Full database)", dist);
    println!("  - {}/items/ ({} individual files)", dist, report.written.items.len());
    if !report.written.pruned.is_empty() {
        println!("  Removed {} stale item file(s)", report.written.pruned.len());
    }

    Ok(())
}
