//! One-hot encoding of low-cardinality text columns.
//!
//! Distinct values are sorted byte-wise and the smallest one is the reference
//! level, which gets no indicator. A column with `k` distinct values is
//! replaced by `k - 1` `Int32` indicator columns named `{column}_{value}`,
//! appended after the remaining columns.

use super::Stage;
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::pipeline::CleaningStage;
use crate::table::{ColumnKind, Table};
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Replaces eligible text columns with 0/1 indicator columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    /// Build the indicator columns for one text column.
    ///
    /// Returns `None` when the column has more distinct values than allowed.
    fn indicators(series: &Series, max_unique: usize) -> Result<Option<Vec<Series>>> {
        let cells = series.str()?;
        let distinct: BTreeSet<&str> = cells.into_iter().flatten().collect();

        if distinct.len() > max_unique {
            return Ok(None);
        }

        let indicators = distinct
            .iter()
            .skip(1)
            .map(|&level| {
                let values: Vec<i32> = cells
                    .into_iter()
                    .map(|cell| i32::from(cell == Some(level)))
                    .collect();
                Series::new(format!("{}_{}", series.name(), level).into(), values)
            })
            .collect();

        Ok(Some(indicators))
    }
}

impl Stage for CategoricalEncoder {
    fn id(&self) -> CleaningStage {
        CleaningStage::Encoding
    }

    fn is_enabled(&self, config: &CleaningConfig) -> bool {
        config.encode_categoricals
    }

    fn apply(&self, mut table: Table, config: &CleaningConfig) -> Result<Table> {
        if !self.is_enabled(config) {
            return Ok(table);
        }

        let mut encoded = Vec::new();
        let mut new_columns = Vec::new();

        for name in table.columns_of_kind(ColumnKind::Text) {
            match Self::indicators(table.series(&name)?, config.max_unique_for_encoding)? {
                Some(indicators) => {
                    debug!(
                        "Encoding column '{}' into {} indicator columns",
                        name,
                        indicators.len()
                    );
                    encoded.push(name);
                    new_columns.extend(indicators);
                }
                None => debug!(
                    "Skipping encoding for '{}' (more than {} distinct values)",
                    name, config.max_unique_for_encoding
                ),
            }
        }

        if encoded.is_empty() {
            return Ok(table);
        }

        table.drop_columns(&encoded);

        let mut names: HashSet<String> = table.column_names().into_iter().collect();
        for series in &new_columns {
            let name = series.name().to_string();
            if !names.insert(name.clone()) {
                return Err(CleaningError::Schema(format!(
                    "indicator column '{}' collides with an existing column",
                    name
                )));
            }
        }

        for series in new_columns {
            table.push_column(series, ColumnKind::Numeric)?;
        }

        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================
