//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running the ordered cleaning stages over a table.

use crate::config::{CleaningConfig, ConfigValidationError};
use crate::error::{Result, ResultExt};
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::stages::{Stage, default_stages};
use crate::table::Table;
use crate::types::{CleaningResult, CleaningSummary, StageReport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Share of rows removed above which the summary carries a warning.
const HIGH_ROW_LOSS_PERCENT: f32 = 30.0;

/// The cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::{CleaningConfig, OutlierMethod, Pipeline, Table};
///
/// let config = CleaningConfig::builder()
///     .outlier_method(OutlierMethod::Iqr)
///     .build()?;
///
/// let cleaned = Pipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .clean(Table::new(df)?)?;
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    stages: Vec<Box<dyn Stage>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// One configured pipeline may be shared across threads; each run owns its table
static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration every stage receives.
    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Identifiers of the stages this pipeline runs, in order.
    pub fn stage_ids(&self) -> Vec<CleaningStage> {
        self.stages.iter().map(|stage| stage.id()).collect()
    }

    /// Run every stage over the table and return the cleaned table.
    pub fn clean(&self, table: Table) -> Result<Table> {
        self.process(table).map(|result| result.table)
    }

    /// Run every stage over the table, returning the cleaned table and a
    /// summary of what each stage did.
    ///
    /// # Errors
    ///
    /// The first error raised by a stage aborts the run. It is returned as
    /// [`CleaningError::StageFailed`](crate::CleaningError::StageFailed)
    /// naming the stage.
    pub fn process(&self, table: Table) -> Result<CleaningResult> {
        match self.process_internal(table) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, table: Table) -> Result<CleaningResult> {
        let start_time = Instant::now();

        info!("Starting cleaning pipeline...");

        let mut summary = CleaningSummary::new();
        summary.rows_before = table.height();
        summary.columns_before = table.width();
        summary.missing_cells_before = missing_cells(&table);

        let mut table = table;

        for (step, stage) in self.stages.iter().enumerate() {
            let id = stage.id();

            if !stage.is_enabled(&self.config) {
                info!("Step {}: Skipping {} (disabled)", step + 1, id);
                summary.stages.push(StageReport::skipped(id, &table));
                continue;
            }

            self.report_progress(ProgressUpdate::new(id, 0.0, format!("{}...", id)));
            info!("Step {}: {}...", step + 1, id);

            let rows_before = table.height();
            let columns_before = table.column_names();

            table = stage.apply(table, &self.config).in_stage(id)?;

            let report = StageReport::between(id, rows_before, &columns_before, &table);
            if report.changed_shape() {
                debug!(
                    "{}: rows {} -> {}, removed columns {:?}, added columns {:?}",
                    id,
                    report.rows_before,
                    report.rows_after,
                    report.columns_removed,
                    report.columns_added
                );
            }
            summary.stages.push(report);

            self.report_progress(ProgressUpdate::new(id, 1.0, format!("{} complete", id)));
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.rows_after = table.height();
        summary.columns_after = table.width();
        summary.rows_removed = summary.rows_before.saturating_sub(summary.rows_after);
        summary.missing_cells_after = missing_cells(&table);

        if summary.rows_removed_percentage() > HIGH_ROW_LOSS_PERCENT {
            summary.add_warning(format!(
                "High data loss: {:.1}% of rows were removed",
                summary.rows_removed_percentage()
            ));
        }
        if summary.missing_cells_after > 0 {
            summary.add_warning(format!(
                "{} missing cells remain after cleaning",
                summary.missing_cells_after
            ));
        }

        info!(
            "Cleaning complete: {} x {} -> {} x {} in {}ms",
            summary.rows_before,
            summary.columns_before,
            summary.rows_after,
            summary.columns_after,
            summary.duration_ms
        );

        Ok(CleaningResult { table, summary })
    }
}

/// Total number of missing cells in a table.
fn missing_cells(table: &Table) -> usize {
    table
        .frame()
        .get_columns()
        .iter()
        .map(|column| column.null_count())
        .sum()
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    stages: Option<Vec<Box<dyn Stage>>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default stage list.
    ///
    /// Stages run in the given order. Mostly useful for running a subset of
    /// the standard stages or inserting a custom one.
    pub fn stages(mut self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.stages = Some(stages);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use lex_cleaning::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            stages: self.stages.unwrap_or_else(default_stages),
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutlierMethod, ScalingMethod};
    use crate::error::CleaningError;
    use crate::stages::{ColumnNormalizer, Imputer};
    use polars::prelude::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_table() -> Table {
        let df = df![
            "ID" => &[1i64, 2, 3, 3],
            "Name" => &[Some("Alice"), None, Some("carol"), Some("carol")],
            "Score" => &[Some(1.0f64), Some(2.0), None, None],
        ]
        .unwrap();
        Table::new(df).unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &CleaningConfig::default());
        assert_eq!(pipeline.stage_ids(), CleaningStage::ORDER.to_vec());
    }

    #[test]
    fn test_pipeline_builder_with_config() {
        let config = CleaningConfig::builder()
            .scaling_method(ScalingMethod::Standard)
            .outlier_method(OutlierMethod::ZScore)
            .build()
            .unwrap();

        let pipeline = Pipeline::builder().config(config).build().unwrap();

        assert_eq!(pipeline.config().scaling_method, ScalingMethod::Standard);
        assert_eq!(pipeline.config().outlier_method, OutlierMethod::ZScore);
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = CleaningConfig {
            missing_threshold: 2.0,
            ..Default::default()
        };

        let result = Pipeline::builder().config(config).build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_process_summary_tracks_each_stage() {
        let pipeline = Pipeline::builder().build().unwrap();
        let result = pipeline.process(sample_table()).unwrap();
        let summary = &result.summary;

        assert_eq!(summary.stages.len(), 9);
        assert_eq!(summary.rows_before, 4);
        assert_eq!(summary.columns_before, 3);
        assert_eq!(summary.missing_cells_before, 3);
        assert_eq!(summary.missing_cells_after, 0);

        // Default config has no outlier method or scaling
        assert!(summary.stage(CleaningStage::OutlierRemoval).unwrap().skipped);
        assert!(summary.stage(CleaningStage::Scaling).unwrap().skipped);

        // Imputation makes rows 3 and 4 identical
        let dedup = summary.stage(CleaningStage::Deduplication).unwrap();
        assert_eq!(dedup.rows_removed(), 1);
        assert_eq!(summary.rows_after, 3);
    }

    #[test]
    fn test_progress_reported_for_enabled_stages() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.clean(sample_table()).unwrap();

        // 7 enabled stages x (start + end) + completion
        assert_eq!(call_count.load(Ordering::SeqCst), 15);
    }

    #[test]
    fn test_failure_names_the_stage() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = updates.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |update| {
                updates_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();

        let df = df![
            "a" => &[1i64, 2],
            "A" => &[3i64, 4],
        ]
        .unwrap();
        let err = pipeline.clean(Table::new(df).unwrap()).unwrap_err();

        assert_eq!(err.stage(), Some(CleaningStage::ColumnNormalization));
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
        assert!(matches!(err, CleaningError::StageFailed { .. }));
        assert_eq!(
            updates.lock().unwrap().last().copied(),
            Some(CleaningStage::Failed)
        );
    }

    #[test]
    fn test_custom_stage_list() {
        let pipeline = Pipeline::builder()
            .stages(vec![Box::new(ColumnNormalizer), Box::new(Imputer)])
            .build()
            .unwrap();

        let table = pipeline.clean(sample_table()).unwrap();

        assert_eq!(table.height(), 4);
        assert_eq!(
            table.column_names(),
            vec!["id".to_string(), "name".to_string(), "score".to_string()]
        );
    }

    #[test]
    fn test_pipeline_shared_across_threads() {
        let pipeline = Arc::new(Pipeline::builder().build().unwrap());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let pipeline = pipeline.clone();
                std::thread::spawn(move || pipeline.clean(sample_table()).map(|t| t.height()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 3);
        }
    }
}
