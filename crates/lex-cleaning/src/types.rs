//! Result and summary types returned by [`Pipeline::process`](crate::Pipeline::process).

use crate::pipeline::CleaningStage;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// The cleaned table together with a summary of the run.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    pub table: Table,
    pub summary: CleaningSummary,
}

/// Human-readable summary of what the pipeline did.
///
/// # Example
///
/// ```rust,ignore
/// let result = pipeline.process(table)?;
/// println!(
///     "Processed {} rows in {}ms",
///     result.summary.rows_after, result.summary.duration_ms
/// );
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows before cleaning.
    pub rows_before: usize,
    /// Number of rows after cleaning.
    pub rows_after: usize,
    /// Number of rows removed during cleaning.
    pub rows_removed: usize,

    /// Number of columns before cleaning.
    pub columns_before: usize,
    /// Number of columns after cleaning.
    pub columns_after: usize,

    /// Missing cells in the input table.
    pub missing_cells_before: usize,
    /// Missing cells in the output table.
    pub missing_cells_after: usize,

    /// What each stage did, in execution order.
    pub stages: Vec<StageReport>,

    /// Warnings and notes generated during cleaning.
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed as f32 / self.rows_before as f32) * 100.0
        }
    }

    /// The report for a given stage, if it ran.
    pub fn stage(&self, stage: CleaningStage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }
}

/// Shape changes made by a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: CleaningStage,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Columns present before the stage and absent after it.
    pub columns_removed: Vec<String>,
    /// Columns absent before the stage and present after it.
    pub columns_added: Vec<String>,
    /// The stage was disabled by the configuration.
    pub skipped: bool,
}

impl StageReport {
    /// Diff the column sets and row counts around a stage.
    pub fn between(
        stage: CleaningStage,
        rows_before: usize,
        columns_before: &[String],
        after: &Table,
    ) -> Self {
        let columns_after = after.column_names();

        Self {
            stage,
            rows_before,
            rows_after: after.height(),
            columns_removed: columns_before
                .iter()
                .filter(|name| !columns_after.contains(name))
                .cloned()
                .collect(),
            columns_added: columns_after
                .iter()
                .filter(|name| !columns_before.contains(name))
                .cloned()
                .collect(),
            skipped: false,
        }
    }

    /// A report for a stage the configuration turned off.
    pub fn skipped(stage: CleaningStage, table: &Table) -> Self {
        Self {
            stage,
            rows_before: table.height(),
            rows_after: table.height(),
            columns_removed: Vec::new(),
            columns_added: Vec::new(),
            skipped: true,
        }
    }

    /// Number of rows the stage removed.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Whether the stage changed the table's shape.
    pub fn changed_shape(&self) -> bool {
        self.rows_before != self.rows_after
            || !self.columns_removed.is_empty()
            || !self.columns_added.is_empty()
    }
}
