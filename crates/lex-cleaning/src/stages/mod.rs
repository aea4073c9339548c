//! Cleaning stages.
//!
//! Each stage is an independent transformation of a [`Table`] driven only by
//! the table's state and the [`CleaningConfig`]. The pipeline runs them in the
//! order returned by [`default_stages`]:
//!
//! 1. Column normalization (lowercase names)
//! 2. Column pruning (missing-value threshold)
//! 3. Imputation (mode / median)
//! 4. Date normalization (ISO dates)
//! 5. Deduplication
//! 6. Text normalization (lowercase + trim)
//! 7. Outlier removal (IQR / z-score)
//! 8. Scaling (standard / min-max)
//! 9. Categorical encoding (one-hot)

mod columns;
mod dates;
mod dedup;
mod encoding;
mod imputer;
mod outliers;
mod scaling;
mod text;

pub use columns::{ColumnNormalizer, ColumnPruner};
pub use dates::{DateNormalizer, parse_date};
pub use dedup::Deduplicator;
pub use encoding::CategoricalEncoder;
pub use imputer::Imputer;
pub use outliers::OutlierFilter;
pub use scaling::Scaler;
pub use text::TextNormalizer;

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::pipeline::CleaningStage;
use crate::table::Table;

/// A single transformation step of the pipeline.
///
/// Stages take the table by value and return the transformed table. A stage
/// that has nothing to do under the given configuration returns its input
/// unchanged.
pub trait Stage: Send + Sync {
    /// Identifies the stage in logs, errors and progress updates.
    fn id(&self) -> CleaningStage;

    /// Whether the stage does anything under this configuration.
    fn is_enabled(&self, _config: &CleaningConfig) -> bool {
        true
    }

    /// Transform the table.
    fn apply(&self, table: Table, config: &CleaningConfig) -> Result<Table>;
}

/// The nine stages in pipeline order.
pub fn default_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(ColumnNormalizer),
        Box::new(ColumnPruner),
        Box::new(Imputer),
        Box::new(DateNormalizer),
        Box::new(Deduplicator),
        Box::new(TextNormalizer),
        Box::new(OutlierFilter),
        Box::new(Scaler),
        Box::new(CategoricalEncoder),
    ]
}
