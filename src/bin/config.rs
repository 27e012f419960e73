//! Catalog Config CLI
//!
//! View and manage catalog build configuration.

use clap::{Parser, Subcommand};
use storage_catalog::CatalogConfig;

#[derive(Parser)]
#[command(name = "catalog-config")]
#[command(about = "View and manage catalog build configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "catalog.toml")]
        output: String,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = CatalogConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Catalog Configuration\n");
                println!("Paths:");
                println!("  Content root: {:?}", cfg.paths.content_root);
                println!("  Schemas: {:?}", cfg.paths.schema_dir);
                println!("  Dist: {:?}", cfg.paths.dist_dir);

                println!("\nLoader:");
                println!("  Excluded dirs: {}", cfg.loader.exclude_dirs.join(", "));
                println!("  Excluded files: {}", cfg.loader.exclude_files.join(", "));

                println!("\nBuild:");
                println!("  Format version: {}", cfg.build.format_version);
                println!("  Output format: {:?}", cfg.build.output_format);
                println!("  Prune stale items: {}", cfg.build.prune_stale);
            }
        }

        Commands::Init { output } => {
            let cfg = CatalogConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => {
            let checked = CatalogConfig::load_from(config.as_deref())
                .map_err(|e| e.to_string())
                .and_then(|cfg| cfg.validate().map(|_| cfg).map_err(|e| e.to_string()));
            match checked {
                Ok(cfg) => {
                    println!("✅ Configuration is valid");
                    println!("   Content root: {:?}", cfg.paths.content_root);
                    println!("   Dist: {:?}", cfg.paths.dist_dir);
                    println!("   Format version: {}", cfg.build.format_version);
                }
                Err(e) => {
                    eprintln!("❌ Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
