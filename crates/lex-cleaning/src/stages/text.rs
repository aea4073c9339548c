//! Text normalization: lowercase and trim every text value.

use super::Stage;
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::pipeline::CleaningStage;
use crate::table::{ColumnKind, Table};
use polars::prelude::*;
use tracing::debug;

/// Lowercases and trims the values of every text column.
///
/// Missing values stay missing; numeric, date and unknown columns are left
/// alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNormalizer;

/// Canonical form of a text value.
pub(crate) fn normalize_value(value: &str) -> String {
    value.to_lowercase().trim().to_string()
}

impl Stage for TextNormalizer {
    fn id(&self) -> CleaningStage {
        CleaningStage::TextNormalization
    }

    fn is_enabled(&self, config: &CleaningConfig) -> bool {
        config.normalize_text
    }

    fn apply(&self, mut table: Table, config: &CleaningConfig) -> Result<Table> {
        if !self.is_enabled(config) {
            return Ok(table);
        }

        for name in table.columns_of_kind(ColumnKind::Text) {
            let series = table.series(&name)?;
            let cleaned: Vec<Option<String>> = series
                .str()?
                .into_iter()
                .map(|value| value.map(normalize_value))
                .collect();

            let series = Series::new(name.as_str().into(), cleaned);
            table.replace_column(series, ColumnKind::Text)?;
            debug!("Normalized text in column '{}'", name);
        }

        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================
