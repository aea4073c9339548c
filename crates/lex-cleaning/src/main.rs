//! CLI entry point for the data cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use lex_cleaning::{
    CleaningConfig, CleaningConfigBuilder, CleaningResult, CleaningSummary, DateColumns,
    OutlierMethod, Pipeline, ScalingMethod, Table,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI-compatible scaling method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliScaling {
    /// Leave numeric columns as they are
    None,
    /// Subtract the mean and divide by the standard deviation
    Standard,
    /// Map each column onto [0, 1]
    Minmax,
}

impl From<CliScaling> for ScalingMethod {
    fn from(cli: CliScaling) -> Self {
        match cli {
            CliScaling::None => ScalingMethod::None,
            CliScaling::Standard => ScalingMethod::Standard,
            CliScaling::Minmax => ScalingMethod::MinMax,
        }
    }
}

/// CLI-compatible outlier method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutliers {
    /// Keep every row
    None,
    /// Drop rows outside 1.5 x IQR of any numeric column
    Iqr,
    /// Drop rows with |z| >= 3 in any numeric column
    Zscore,
}

impl From<CliOutliers> for OutlierMethod {
    fn from(cli: CliOutliers) -> Self {
        match cli {
            CliOutliers::None => OutlierMethod::None,
            CliOutliers::Iqr => OutlierMethod::Iqr,
            CliOutliers::Zscore => OutlierMethod::ZScore,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data cleaning pipeline",
    long_about = "Cleans a CSV file: normalizes column names, prunes sparse columns, imputes \
                  missing values, normalizes dates and text, removes duplicates and outliers, \
                  scales numeric columns and one-hot encodes categoricals.\n\n\
                  EXAMPLES:\n  \
                  # Defaults, writes cleaned_data.csv next to the input\n  \
                  lex-cleaning -i data.csv\n\n  \
                  # IQR outlier removal with min-max scaling\n  \
                  lex-cleaning -i data.csv --outliers iqr --scaling minmax\n\n  \
                  # Settings from a file, with one override\n  \
                  lex-cleaning -i data.csv --config cleaning.json --max-unique 5\n\n  \
                  # Machine-readable summary\n  \
                  lex-cleaning -i data.csv --json | jq .summary.rows_removed"
)]
struct Args {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: String,

    /// Path of the cleaned CSV file
    ///
    /// Defaults to cleaned_<input name>.csv in the input's directory
    #[arg(short, long)]
    output: Option<String>,

    /// JSON file with cleaning settings; flags below override it
    #[arg(long)]
    config: Option<String>,

    /// Drop columns whose missing fraction exceeds this value (0.0 - 1.0)
    #[arg(long)]
    missing_threshold: Option<f64>,

    /// Scaling applied to numeric columns
    #[arg(long, value_enum)]
    scaling: Option<CliScaling>,

    /// Method used to drop outlier rows
    #[arg(long, value_enum)]
    outliers: Option<CliOutliers>,

    /// Do not one-hot encode text columns
    #[arg(long)]
    no_encode: bool,

    /// Treat this column as a date column (repeatable)
    ///
    /// Without it, every column whose name contains "date" is parsed
    #[arg(long = "date-column", value_name = "NAME")]
    date_columns: Vec<String>,

    /// Maximum distinct values for a text column to be encoded
    #[arg(long)]
    max_unique: Option<usize>,

    /// Keep duplicate rows
    #[arg(long)]
    keep_duplicates: bool,

    /// Output the JSON summary to stdout instead of the human-readable one
    ///
    /// Disables all logs so the output can be piped.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the summary)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries JSON.
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

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;
    let output_path = resolve_output_path(&args);

    info!("Loading dataset from: {}", args.input);
    let data = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let result = match pipeline.process(Table::new(data)?) {
        Ok(result) => result,
        Err(e) => {
            error!("Cleaning failed [{}]: {}", e.error_code(), e);
            return Err(anyhow!("Cleaning failed: {}", e));
        }
    };

    let mut cleaned = result.table.frame().clone();
    write_csv(&mut cleaned, &output_path)?;
    info!("Cleaned dataset written to: {}", output_path.display());

    if args.json {
        let report = JsonReport {
            input: &args.input,
            output: output_path.display().to_string(),
            config: pipeline.config(),
            summary: &result.summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&result, &args.input, &output_path);
    Ok(())
}

/// What `--json` prints.
#[derive(Serialize)]
struct JsonReport<'a> {
    input: &'a str,
    output: String,
    config: &'a CleaningConfig,
    summary: &'a CleaningSummary,
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<CleaningConfig> {
    let base = match args.config {
        Some(ref path) => {
            info!("Loading configuration from: {}", path);
            CleaningConfig::from_json_file(path)?
        }
        None => CleaningConfig::default(),
    };

    let mut builder = CleaningConfigBuilder::from_config(base);

    if let Some(threshold) = args.missing_threshold {
        builder = builder.missing_threshold(threshold);
    }
    if let Some(scaling) = args.scaling {
        builder = builder.scaling_method(scaling.into());
    }
    if let Some(outliers) = args.outliers {
        builder = builder.outlier_method(outliers.into());
    }
    if args.no_encode {
        builder = builder.encode_categoricals(false);
    }
    if !args.date_columns.is_empty() {
        builder = builder.date_columns(DateColumns::explicit(&args.date_columns));
    }
    if let Some(max_unique) = args.max_unique {
        builder = builder.max_unique_for_encoding(max_unique);
    }
    if args.keep_duplicates {
        builder = builder.remove_duplicates(false);
    }

    Ok(builder.build()?)
}

/// `-o` if given, otherwise `cleaned_<stem>.csv` beside the input.
fn resolve_output_path(args: &Args) -> PathBuf {
    if let Some(ref output) = args.output {
        return PathBuf::from(output);
    }

    let input = Path::new(&args.input);
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    input.with_file_name(format!("cleaned_{}.csv", stem))
}

fn load_csv(path: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| anyhow!("Failed to read {}: {}", path, e))
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
        info!("Created output directory: {}", parent.display());
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))
}

/// Print a human-readable summary of the cleaning run.
///
/// Uses `println!` so it shows regardless of log level.
fn print_human_readable_summary(result: &CleaningResult, input: &str, output: &Path) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        input, summary.rows_before, summary.columns_before
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output.display(),
        summary.rows_after,
        summary.columns_after
    );
    println!();

    println!("Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {:.1}%)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed,
        summary.rows_removed_percentage()
    );
    println!(
        "  Columns: {} -> {}",
        summary.columns_before, summary.columns_after
    );
    println!(
        "  Missing cells: {} -> {}",
        summary.missing_cells_before, summary.missing_cells_after
    );
    println!();

    println!("Stages:");
    println!("{}", "-".repeat(40));
    for report in &summary.stages {
        if report.skipped {
            println!("  {:<24} skipped", report.stage.display_name());
            continue;
        }
        if !report.changed_shape() {
            println!("  {:<24} no shape change", report.stage.display_name());
            continue;
        }

        println!(
            "  {:<24} rows {} -> {}",
            report.stage.display_name(),
            report.rows_before,
            report.rows_after
        );
        if !report.columns_removed.is_empty() {
            println!("    - removed: {}", report.columns_removed.join(", "));
        }
        if !report.columns_added.is_empty() {
            println!("    + added: {}", report.columns_added.join(", "));
        }
    }
    println!();

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
