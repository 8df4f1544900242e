//! Batch audit of stored sites.
//!
//! Loads a JSON export of locations, re-runs the zone and pole containment
//! rules against every stored record, and reports what would no longer
//! validate.

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod check;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use sitefence::models::Location;

use crate::check::{audit_all, enforce_strict};

#[derive(Parser, Debug)]
#[command(name = "audit")]
#[command(about = "Re-validate stored zones and poles against their boundaries")]
struct Args {
    /// JSON export of locations (array with nested zones and poles)
    #[arg(short, long)]
    file: PathBuf,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Exit with an error if any violation is found
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Sitefence Audit");
    info!("File: {}", args.file.display());

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let locations = Location::load_all_from_file(&args.file)?;
    info!("Loaded {} locations", locations.len());

    let pb = ProgressBar::new(locations.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let report = audit_all(&locations, &pb);
    pb.finish_and_clear();

    info!(
        "Checked {} locations, {} zones, {} poles, {} cameras",
        report.locations, report.zones, report.poles, report.cameras
    );
    for (kind, count) in report.summary() {
        warn!("  {}: {}", kind, count);
    }

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    enforce_strict(&report, args.strict)
}
