//! Catalog Validator CLI
//!
//! Validates source item files against the item schema. With no arguments
//! every item under the content root is checked.

use std::path::PathBuf;

use clap::Parser;
use storage_catalog::check::{check_catalog, check_files, FileOutcome};
use storage_catalog::{CatalogConfig, SchemaRegistry};

#[derive(Parser)]
#[command(name = "catalog-validate")]
#[command(about = "Validate source item files against the item schema")]
struct Cli {
    /// Files to check (default: the whole catalog)
    files: Vec<PathBuf>,
}

fn main() {
    storage_catalog::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = CatalogConfig::load()?;
    let registry = SchemaRegistry::from_dir_or_embedded(&config.paths.schema_dir)?;
    let root = &config.paths.content_root;
    let explicit = !cli.files.is_empty();

    let summary = if explicit {
        check_files(&registry, root, &cli.files)
    } else {
        check_catalog(&registry, root, &config.load_options())?
    };

    println!("🔍 Validating {} files...", summary.files.len());

    for file in &summary.files {
        let path = file.display_path.display();
        match &file.outcome {
            FileOutcome::Valid => {
                if explicit {
                    println!("✅ Valid: {}", path);
                }
            }
            FileOutcome::Invalid(errors) => {
                eprintln!("❌ Invalid: {}", path);
                for error in errors {
                    eprintln!("   - {}", error);
                }
            }
            FileOutcome::Unparseable(reason) => {
                eprintln!("❌ Error parsing {}: {}", path, reason);
            }
        }
    }

    println!();
    if summary.is_success() {
        println!("✅ All {} files passed validation.", summary.files.len());
        Ok(true)
    } else {
        eprintln!("❌ Validation failed with {} errors.", summary.error_count());
        Ok(false)
    }
}
