//! Tabular Data Cleaning Library
//!
//! A configurable data cleaning pipeline built with Rust and Polars.
//!
//! # Overview
//!
//! A dataset is run through nine independent stages, in order:
//!
//! - **Column Normalization**: lowercase column names
//! - **Column Pruning**: drop columns with too many missing values
//! - **Imputation**: fill missing values with the median (numeric) or mode (text)
//! - **Date Normalization**: parse date columns to ISO `YYYY-MM-DD`
//! - **Deduplication**: remove exact duplicate rows
//! - **Text Normalization**: lowercase and trim text values
//! - **Outlier Removal**: drop rows outside IQR or z-score bounds
//! - **Scaling**: standard or min-max scaling of numeric columns
//! - **Categorical Encoding**: one-hot encode low-cardinality text columns
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_cleaning::{CleaningConfig, OutlierMethod, Pipeline, ScalingMethod, Table};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("data.csv".into()))?
//!     .finish()?;
//!
//! let config = CleaningConfig::builder()
//!     .missing_threshold(0.5)
//!     .outlier_method(OutlierMethod::Iqr)
//!     .scaling_method(ScalingMethod::MinMax)
//!     .max_unique_for_encoding(5)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .build()?
//!     .process(Table::new(df)?)?;
//!
//! println!("{} rows removed", result.summary.rows_removed);
//! ```
//!
//! Or, for a plain DataFrame in and out:
//!
//! ```rust,ignore
//! let cleaned: DataFrame = lex_cleaning::clean_dataset(df, &CleaningConfig::default())?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, DateColumns, OutlierMethod,
    ScalingMethod,
};
pub use error::{CleaningError, Result};
pub use pipeline::{
    CleaningStage, ClosureProgressReporter, Pipeline, PipelineBuilder, ProgressReporter,
    ProgressUpdate,
};
pub use stages::Stage;
pub use table::{ColumnKind, Table};
pub use types::{CleaningResult, CleaningSummary, StageReport};

use polars::prelude::DataFrame;

/// Clean a DataFrame with the standard stages.
///
/// Convenience wrapper that classifies the columns, runs the default pipeline
/// and hands back the underlying DataFrame.
pub fn clean_dataset(df: DataFrame, config: &CleaningConfig) -> Result<DataFrame> {
    let pipeline = Pipeline::builder().config(config.clone()).build()?;
    let table = pipeline.clean(Table::try_from(df)?)?;
    Ok(table.into_frame())
}
