//! Exact duplicate row removal.

use super::Stage;
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::pipeline::CleaningStage;
use crate::table::Table;
use polars::prelude::*;
use tracing::debug;

/// Removes rows that repeat an earlier row in every column.
///
/// Missing equals missing. The first occurrence is kept and row order is
/// otherwise preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct Deduplicator;

impl Stage for Deduplicator {
    fn id(&self) -> CleaningStage {
        CleaningStage::Deduplication
    }

    fn is_enabled(&self, config: &CleaningConfig) -> bool {
        config.remove_duplicates
    }

    fn apply(&self, mut table: Table, config: &CleaningConfig) -> Result<Table> {
        if !self.is_enabled(config) || table.height() < 2 || table.width() == 0 {
            return Ok(table);
        }

        let unique = table
            .frame()
            .unique_stable(None, UniqueKeepStrategy::First, None)?;

        let duplicates = table.height() - unique.height();
        if duplicates > 0 {
            debug!("Removed {} duplicate rows", duplicates);
            table.replace_rows(unique)?;
        } else {
            debug!("No duplicate rows found");
        }

        Ok(table)
    }
}

// =============================================================================
// Tests
// =============================================================================
