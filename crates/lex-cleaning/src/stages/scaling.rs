//! Numeric scaling.

use super::Stage;
use crate::config::{CleaningConfig, ScalingMethod};
use crate::error::Result;
use crate::pipeline::CleaningStage;
use crate::table::{ColumnKind, Table};
use crate::utils::float_column;
use polars::prelude::*;
use tracing::debug;

/// Rescales every numeric column in place.
///
/// Parameters are fitted and applied in one pass; nothing is persisted.
/// Columns with zero spread map every non-missing value to 0.0.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scaler;

impl Scaler {
    /// Returns `(offset, divisor)` such that `scaled = (v - offset) / divisor`.
    ///
    /// A divisor of zero means the column has no spread.
    fn fit(method: ScalingMethod, values: &Float64Chunked) -> Option<(f64, f64)> {
        match method {
            ScalingMethod::None => None,
            ScalingMethod::Standard => Some((values.mean()?, values.std(0)?)),
            ScalingMethod::MinMax => {
                let (min, max) = (values.min()?, values.max()?);
                Some((min, max - min))
            }
        }
    }
}

impl Stage for Scaler {
    fn id(&self) -> CleaningStage {
        CleaningStage::Scaling
    }

    fn is_enabled(&self, config: &CleaningConfig) -> bool {
        config.scaling_method != ScalingMethod::None
    }

    fn apply(&self, mut table: Table, config: &CleaningConfig) -> Result<Table> {
        if !self.is_enabled(config) {
            return Ok(table);
        }

        for name in table.columns_of_kind(ColumnKind::Numeric) {
            let values = float_column(table.series(&name)?)?;

            let Some((offset, divisor)) = Self::fit(config.scaling_method, &values) else {
                continue;
            };

            if divisor == 0.0 {
                debug!("Column '{}' has zero spread, scaling to 0", name);
            }

            let scaled: Vec<Option<f64>> = values
                .into_iter()
                .map(|cell| {
                    cell.map(|v| {
                        if divisor == 0.0 {
                            0.0
                        } else {
                            (v - offset) / divisor
                        }
                    })
                })
                .collect();

            let series = Series::new(name.as_str().into(), scaled);
            table.replace_column(series, ColumnKind::Numeric)?;
        }

        debug!("Scaled numeric columns using {} method", config.scaling_method);
        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================
