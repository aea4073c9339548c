//! Outlier removal.
//!
//! Rows are removed when any numeric column holds a value outside that
//! column's bounds. Statistics are computed from non-missing values only and
//! missing cells are never flagged.

use super::Stage;
use crate::config::{CleaningConfig, OutlierMethod};
use crate::error::Result;
use crate::pipeline::CleaningStage;
use crate::table::{ColumnKind, Table};
use crate::utils::float_column;
use polars::prelude::*;
use tracing::debug;

/// Multiplier applied to the interquartile range.
const IQR_FACTOR: f64 = 1.5;

/// Values this many standard deviations from the mean are outliers.
const ZSCORE_LIMIT: f64 = 3.0;

/// The acceptance rule for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bounds {
    /// Inclusive range `[lower, upper]`
    Range { lower: f64, upper: f64 },
    /// `|v - mean| / std < 3`
    ZScore { mean: f64, std: f64 },
    /// Nothing is flagged
    Unbounded,
}

impl Bounds {
    fn fit(method: OutlierMethod, values: &Float64Chunked) -> Result<Self> {
        let bounds = match method {
            OutlierMethod::None => Self::Unbounded,
            OutlierMethod::Iqr => {
                let q1 = values.quantile(0.25, QuantileMethod::Linear)?;
                let q3 = values.quantile(0.75, QuantileMethod::Linear)?;
                match (q1, q3) {
                    (Some(q1), Some(q3)) => {
                        let iqr = q3 - q1;
                        Self::Range {
                            lower: q1 - IQR_FACTOR * iqr,
                            upper: q3 + IQR_FACTOR * iqr,
                        }
                    }
                    _ => Self::Unbounded,
                }
            }
            OutlierMethod::ZScore => match (values.mean(), values.std(0)) {
                (Some(mean), Some(std)) if std > 0.0 => Self::ZScore { mean, std },
                _ => Self::Unbounded,
            },
        };
        Ok(bounds)
    }

    fn accepts(&self, value: f64) -> bool {
        match *self {
            Self::Range { lower, upper } => value >= lower && value <= upper,
            Self::ZScore { mean, std } => ((value - mean) / std).abs() < ZSCORE_LIMIT,
            Self::Unbounded => true,
        }
    }
}

/// Removes rows flagged as outliers in any numeric column.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlierFilter;

impl Stage for OutlierFilter {
    fn id(&self) -> CleaningStage {
        CleaningStage::OutlierRemoval
    }

    fn is_enabled(&self, config: &CleaningConfig) -> bool {
        config.outlier_method != OutlierMethod::None
    }

    fn apply(&self, mut table: Table, config: &CleaningConfig) -> Result<Table> {
        if !self.is_enabled(config) || table.height() == 0 {
            return Ok(table);
        }

        let mut mask = vec![true; table.height()];

        for name in table.columns_of_kind(ColumnKind::Numeric) {
            let values = float_column(table.series(&name)?)?;
            let bounds = Bounds::fit(config.outlier_method, &values)?;

            let mut flagged = 0usize;
            for (keep, cell) in mask.iter_mut().zip(values.into_iter()) {
                if let Some(value) = cell
                    && !bounds.accepts(value)
                {
                    if *keep {
                        flagged += 1;
                    }
                    *keep = false;
                }
            }

            if flagged > 0 {
                debug!(
                    "Column '{}': {} rows outside {:?} bounds",
                    name, flagged, config.outlier_method
                );
            }
        }

        let removed = mask.iter().filter(|keep| !**keep).count();
        if removed > 0 {
            debug!(
                "Removed {} outlier rows using {} method",
                removed, config.outlier_method
            );
            table.filter_rows(&mask)?;
        }

        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================
