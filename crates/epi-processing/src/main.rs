//! CLI entry point for the weekly dataset processing pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use epi_processing::utils::filter_region_prefix;
use epi_processing::{DatasetMerger, Pipeline, PipelineConfig, RegionPolicy};
use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

/// CLI-compatible region policy selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliRegionPolicy {
    /// Pick per dataset kind: density for weekly symptom data,
    /// zero-count for daily series
    Auto,
    /// Keep regions with enough well-populated rows
    Density,
    /// Drop regions dominated by zero-valued metric rows
    ZeroCount,
}

impl From<CliRegionPolicy> for Option<RegionPolicy> {
    fn from(cli: CliRegionPolicy) -> Self {
        match cli {
            CliRegionPolicy::Auto => None,
            CliRegionPolicy::Density => Some(RegionPolicy::Density),
            CliRegionPolicy::ZeroCount => Some(RegionPolicy::ZeroCount),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Weekly aggregation pipeline for regional health datasets",
    long_about = "Cleans, quality-filters, and weekly-aggregates named datasets,\n\
                  memoizing results under the data root.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  EPI_DATA_ROOT    Data root used when --data-root is not given\n\n\
                  EXAMPLES:\n  \
                  # Process one dataset\n  \
                  epi-processing -d aggregated_cc_by_us\n\n  \
                  # Process two datasets and write the merged table\n  \
                  epi-processing -d aggregated_cc_by_us -d 2020_US_weekly_symptoms_dataset_v003 \\\n      \
                  --merge -o merged.parquet\n\n  \
                  # Recompute after a source change\n  \
                  epi-processing -d aggregated_cc_by_us --refresh"
)]
struct Args {
    /// Dataset name to process (repeat the flag for several datasets)
    #[arg(short = 'd', long = "dataset", required = true)]
    datasets: Vec<String>,

    /// Root directory holding raw/ and processed/ trees
    ///
    /// Defaults to $EPI_DATA_ROOT, then ./data
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Minimum non-null fraction for a column to survive cleaning (0.0 - 1.0)
    #[arg(long, default_value = "0.5")]
    column_threshold: f64,

    /// Per-row non-null fraction used by the density region policy (0.0 - 1.0)
    #[arg(long, default_value = "0.5")]
    region_threshold: f64,

    /// Region filtering policy
    #[arg(long, value_enum, default_value = "auto")]
    region_policy: CliRegionPolicy,

    /// Keep only regions whose code starts with this prefix (e.g. "US-")
    ///
    /// Applied to the returned tables, not to the cached entries
    #[arg(long)]
    region_prefix: Option<String>,

    /// Inner-join the two processed datasets on the region+date key
    ///
    /// Requires exactly two --dataset flags
    #[arg(long)]
    merge: bool,

    /// Write the merged table to this parquet file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Drop processed cache entries for the named datasets before running
    #[arg(long)]
    refresh: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output table shapes as JSON instead of a human-readable summary
    ///
    /// Disables all progress logs; only the JSON report reaches stdout
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// only contains the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let data_root = args.data_root.clone().unwrap_or_else(|| {
        std::env::var("EPI_DATA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"))
    });
    if !data_root.exists() {
        return Err(anyhow!("Data root not found: {}", data_root.display()));
    }

    let mut builder = PipelineConfig::builder()
        .data_root(&data_root)
        .column_threshold(args.column_threshold)
        .region_threshold(args.region_threshold);
    if let Some(policy) = Option::<RegionPolicy>::from(args.region_policy) {
        builder = builder.region_policy(policy);
    }
    let config = builder.build()?;

    let pipeline = Pipeline::new(config)?;

    if args.refresh {
        for name in &args.datasets {
            if pipeline.invalidate(name)? {
                info!("Dropped processed cache entry for '{}'", name);
            }
        }
    }

    let mut tables: Vec<(String, DataFrame)> = Vec::new();
    for name in &args.datasets {
        info!("Processing dataset '{}'", name);
        let mut table = pipeline.get_processed(name)?;
        if let Some(prefix) = &args.region_prefix {
            table = filter_region_prefix(&table, prefix)?;
        }
        tables.push((name.clone(), table));
    }

    if args.merge {
        if tables.len() != 2 {
            return Err(anyhow!(
                "--merge requires exactly two datasets, got {}",
                tables.len()
            ));
        }
        let mut merged = DatasetMerger::merge(&tables[0].1, &tables[1].1)?;

        if let Some(path) = &args.output {
            let file = File::create(path)?;
            ParquetWriter::new(file).finish(&mut merged)?;
            info!("Wrote merged table to {}", path.display());
        }
        tables.push(("merged".to_string(), merged));
    }

    if args.json {
        let report: Vec<serde_json::Value> = tables
            .iter()
            .map(|(name, df)| {
                serde_json::json!({
                    "dataset": name,
                    "rows": df.height(),
                    "columns": df.width(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{}", "=".repeat(60));
        println!("PROCESSED TABLES");
        println!("{}", "=".repeat(60));
        for (name, df) in &tables {
            println!("  {:<45} {:>6} rows x {} columns", name, df.height(), df.width());
        }
    }

    Ok(())
}
