//! Iso Diagram CLI
//!
//! Usage:
//!   iso-diagram [OPTIONS] [SCENE]
//!
//! Options:
//!   -b, --batch <FILE>      Operations to apply (TOML, or JSON by extension)
//!   -c, --catalog <FILE>    Layer catalog (TOML format)
//!       --blueprint <FILE>  Build a scene from an architecture blueprint
//!   -o, --output <FILE>     Write the scene here instead of stdout
//!   -d, --dump              Print a one-line-per-shape summary instead of JSON
//!   -h, --help              Print help

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use iso_diagram::{Batch, Blueprint, Catalog, Diagram, EngineConfig};

#[derive(Parser)]
#[command(name = "iso-diagram")]
#[command(about = "Place and edit shapes on isometric diagram layers")]
struct Cli {
    /// Scene JSON to edit (starts from an empty scene if not provided)
    scene: Option<PathBuf>,

    /// Operations to apply, in order
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// Layer catalog file (TOML format)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Build the scene from an architecture blueprint
    #[arg(long, conflicts_with = "scene")]
    blueprint: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a one-line-per-shape summary instead of JSON
    #[arg(short, long)]
    dump: bool,
}

fn main() {
    // WARN by default, override with RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load catalog
    let catalog = match &cli.catalog {
        Some(path) => match Catalog::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading catalog '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Catalog::default(),
    };
    let config = EngineConfig::new().with_catalog(catalog);

    // Starting scene
    let mut diagram = if let Some(path) = &cli.blueprint {
        let blueprint = match Blueprint::from_file(path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error reading blueprint '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        };
        match blueprint.build(config) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error building blueprint: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Some(path) = &cli.scene {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        };
        match Diagram::from_json(&content, config) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error loading scene '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    } else {
        Diagram::new(config)
    };

    // Apply batch; a fatal error still writes what was applied
    let mut failed = false;
    if let Some(path) = &cli.batch {
        let batch = match Batch::from_file(path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error reading batch '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        };
        let report = diagram.apply_batch(&batch.operations);
        info!(applied = report.applied, total = batch.operations.len(), "batch applied");
        if let Some(failure) = report.failure {
            eprintln!(
                "Error: operation {} of {}: {}",
                failure.index + 1,
                batch.operations.len(),
                failure.error
            );
            failed = true;
        }
    }

    let rendered = if cli.dump {
        diagram.scene().to_string()
    } else {
        match diagram.to_json() {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, rendered) {
                eprintln!("Error writing '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => println!("{}", rendered.trim_end()),
    }

    if failed {
        std::process::exit(1);
    }
}
