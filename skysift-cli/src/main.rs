//! skysift CLI - filter, composite and export satellite imagery from the
//! command line.
//!
//! Runs a complete analysis session against the built-in demo catalog:
//! filter a collection by cloudiness, date range and location, mask clouds,
//! composite, clip to the demo urban boundary, and optionally submit an
//! export. `--emit-request` prints the serialized request tree instead of
//! evaluating it.

mod error;
mod runner;

use clap::{Parser, ValueEnum};
use skysift::composite::CompositePolicy;
use skysift::config::{config_directory, ConfigFile};
use skysift::logging::init_logging;
use std::path::PathBuf;
use tracing::info;

use error::CliError;
use runner::{ExportOptions, SessionOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Last valid value per pixel wins
    Mosaic,
    /// Per-pixel median of valid values
    Median,
    /// Per-pixel mean of valid values
    Mean,
}

impl From<PolicyArg> for CompositePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Mosaic => CompositePolicy::Mosaic,
            PolicyArg::Median => CompositePolicy::Median,
            PolicyArg::Mean => CompositePolicy::Mean,
        }
    }
}

#[derive(Parser)]
#[command(name = "skysift")]
#[command(version = skysift::VERSION)]
#[command(about = "Filter, composite and export satellite imagery", long_about = None)]
struct Args {
    /// Image collection to load
    #[arg(long, default_value = runner::DEMO_COLLECTION)]
    collection: String,

    /// Start of the date range (inclusive), YYYY-MM-DD
    #[arg(long, default_value = "2019-01-01")]
    start: String,

    /// End of the date range (exclusive), YYYY-MM-DD
    #[arg(long, default_value = "2020-01-01")]
    end: String,

    /// Keep only scenes with cloudy-pixel percentage below this value
    #[arg(long, default_value = "30.0")]
    max_cloud: f64,

    /// Longitude the scene footprint must cover, decimal degrees
    #[arg(long, default_value = "-117.1801")]
    lon: f64,

    /// Latitude the scene footprint must cover, decimal degrees
    #[arg(long, default_value = "46.727")]
    lat: f64,

    /// Compositing policy
    #[arg(long, value_enum, default_value = "median")]
    policy: PolicyArg,

    /// Skip the QA-band cloud mask
    #[arg(long)]
    no_mask: bool,

    /// Keep only bands matching this pattern (e.g. "B.*")
    #[arg(long)]
    select: Option<String>,

    /// Print the serialized request tree instead of evaluating it
    #[arg(long)]
    emit_request: bool,

    /// Build and submit an export with this description
    #[arg(long)]
    export: Option<String>,

    /// Drive folder for the export (default from config)
    #[arg(long)]
    folder: Option<String>,

    /// Export sample spacing in meters per pixel (default from config)
    #[arg(long)]
    scale: Option<f64>,

    /// Upper bound on exported pixels (default from config)
    #[arg(long)]
    max_pixels: Option<u64>,

    /// Path to an alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigFile::load_from(path),
        None => ConfigFile::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => CliError::Config(e.to_string()).exit(),
    };

    let log_dir = if config.logging.directory.is_absolute() {
        config.logging.directory.clone()
    } else {
        config_directory().join(&config.logging.directory)
    };
    let _logging_guard = match init_logging(&log_dir, &config.logging.file) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };
    info!(version = skysift::VERSION, "skysift session started");

    let export = args.export.as_ref().map(|description| ExportOptions {
        folder: args.folder.clone().unwrap_or_else(|| config.export.folder.clone()),
        description: description.clone(),
        scale: args.scale.unwrap_or(config.export.scale),
        max_pixels: args.max_pixels.unwrap_or(config.export.max_pixels),
    });

    let options = SessionOptions {
        collection: args.collection,
        start: args.start,
        end: args.end,
        max_cloud: args.max_cloud,
        lon: args.lon,
        lat: args.lat,
        policy: args.policy.into(),
        skip_mask: args.no_mask,
        select: args.select,
        emit_request: args.emit_request,
        export,
    };

    if let Err(e) = runner::run(&options) {
        e.exit();
    }
}
