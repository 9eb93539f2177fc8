// ==============================================================================
// main.rs - Genotype Importer Entry Point
// ==============================================================================
// Description: Command-line entry point converting one vendor genotyping export
//              into a colony import file
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genotype_importer::config::{default_config_dir, COLONY_CONFIG_FILENAME, VENDOR_CONFIG_FILENAME};
use genotype_importer::processor::{Converter, ConverterOptions, ErrorPolicy};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert genotyping vendor exports into colony import files", long_about = None)]
struct Args {
    /// Export to convert; relative names are looked up in the root directory
    #[arg(value_name = "FILE", required_unless_present = "file", conflicts_with = "file")]
    input: Option<PathBuf>,

    /// Export to convert (same as the positional argument)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Directory relative export names resolve against [default: ~/Downloads]
    #[arg(long, env = "GENOTYPE_IMPORTER_ROOT")]
    root_dir: Option<PathBuf>,

    /// Directory the import file is written to [default: root directory]
    #[arg(short, long, env = "GENOTYPE_IMPORTER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Directory relative config paths resolve against [default: config/ next to the program]
    #[arg(long, env = "GENOTYPE_IMPORTER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Vendor strain/mutation config (JSON)
    #[arg(long, default_value = VENDOR_CONFIG_FILENAME)]
    vendor_config: PathBuf,

    /// Colony ID config (TOML)
    #[arg(long, default_value = COLONY_CONFIG_FILENAME)]
    colony_config: PathBuf,

    /// Leave out records that cannot be resolved instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Write a JSON run summary to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

fn default_root_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .context("HOME is not set; pass --root-dir or set GENOTYPE_IMPORTER_ROOT")?;
    Ok(PathBuf::from(home).join("Downloads"))
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genotype_importer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments
    let args = Args::parse();

    let file = args
        .input
        .or(args.file)
        .context("An export file must be given as first argument or with -f/--file")?;

    let root_dir = match args.root_dir {
        Some(dir) => dir,
        None => default_root_dir()?,
    };
    let output_dir = args.output_dir.unwrap_or_else(|| root_dir.clone());

    let options = ConverterOptions {
        input: root_dir.join(file),
        output_dir,
        config_dir: args.config_dir.unwrap_or_else(default_config_dir),
        vendor_config: args.vendor_config,
        colony_config: args.colony_config,
        error_policy: if args.skip_invalid {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        },
    };

    let summary = Converter::new(options).convert()?;

    if let Some(report) = args.report {
        summary.write_json(&report)?;
        info!("Run summary written to {:?}", report);
    }

    println!("Conversion done: {}", summary.output_file.display());
    Ok(())
}
