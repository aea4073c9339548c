//! Missing-value imputation.
//!
//! Numeric columns are filled with their median, text columns with their mode.
//! Columns of unknown kind are rendered to strings and mode-filled, becoming
//! text.

use super::Stage;
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::pipeline::CleaningStage;
use crate::table::{ColumnKind, Table};
use crate::utils::{float_column, string_cells, string_mode};
use polars::prelude::*;
use tracing::debug;

/// Fills every missing cell with a per-column statistic.
#[derive(Debug, Default, Clone, Copy)]
pub struct Imputer;

impl Imputer {
    fn impute_numeric(table: &mut Table, name: &str) -> Result<()> {
        let values = float_column(table.series(name)?)?;
        let fill = values.median().ok_or_else(|| all_missing(name))?;

        let filled: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(fill)).collect();

        debug!("Filled '{}' with median: {}", name, fill);
        table.replace_column(Series::new(name.into(), filled), ColumnKind::Numeric)
    }

    fn impute_text(table: &mut Table, name: &str) -> Result<()> {
        let series = table.series(name)?;
        let fill = string_mode(series)?.ok_or_else(|| all_missing(name))?;

        let filled: Vec<String> = string_cells(series)?
            .into_iter()
            .map(|v| v.unwrap_or_else(|| fill.clone()))
            .collect();

        debug!("Filled '{}' with mode: '{}'", name, fill);
        table.replace_column(Series::new(name.into(), filled), ColumnKind::Text)
    }
}

fn all_missing(column: &str) -> CleaningError {
    CleaningError::Imputation {
        column: column.to_string(),
        reason: "column has no non-missing values".to_string(),
    }
}

impl Stage for Imputer {
    fn id(&self) -> CleaningStage {
        CleaningStage::Imputation
    }

    fn apply(&self, mut table: Table, _config: &CleaningConfig) -> Result<Table> {
        for name in table.column_names() {
            if table.series(&name)?.null_count() == 0 {
                continue;
            }

            match table.kind(&name) {
                Some(ColumnKind::Numeric) => Self::impute_numeric(&mut table, &name)?,
                Some(ColumnKind::Text) | Some(ColumnKind::Unknown) => {
                    Self::impute_text(&mut table, &name)?
                }
                Some(ColumnKind::Date) | None => {}
            }
        }

        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================
