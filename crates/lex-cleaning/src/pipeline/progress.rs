//! Progress reporting for the cleaning pipeline.
//!
//! This module provides the stage identifiers shared by logs, errors and
//! progress updates, plus the reporter trait callers implement to follow a run.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_cleaning::Pipeline;
//!
//! let cleaned = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .clean(table)?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of the cleaning pipeline, in execution order.
///
/// `Complete` and `Failed` are terminal states used only in progress updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Lowercasing column names
    ColumnNormalization,
    /// Dropping columns with too many missing values
    ColumnPruning,
    /// Filling missing values
    Imputation,
    /// Parsing date columns to ISO dates
    DateNormalization,
    /// Removing exact duplicate rows
    Deduplication,
    /// Lowercasing and trimming text values
    TextNormalization,
    /// Removing outlier rows
    OutlierRemoval,
    /// Rescaling numeric columns
    Scaling,
    /// One-hot encoding categorical columns
    Encoding,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// The processing stages in the order the pipeline runs them.
    pub const ORDER: [CleaningStage; 9] = [
        Self::ColumnNormalization,
        Self::ColumnPruning,
        Self::Imputation,
        Self::DateNormalization,
        Self::Deduplication,
        Self::TextNormalization,
        Self::OutlierRemoval,
        Self::Scaling,
        Self::Encoding,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ColumnNormalization => "Column Normalization",
            Self::ColumnPruning => "Column Pruning",
            Self::Imputation => "Imputation",
            Self::DateNormalization => "Date Normalization",
            Self::Deduplication => "Deduplication",
            Self::TextNormalization => "Text Normalization",
            Self::OutlierRemoval => "Outlier Removal",
            Self::Scaling => "Scaling",
            Self::Encoding => "Categorical Encoding",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// Weights of the processing stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::ColumnNormalization => 0.04,
            Self::ColumnPruning => 0.08,
            Self::Imputation => 0.16,
            Self::DateNormalization => 0.14,
            Self::Deduplication => 0.12,
            Self::TextNormalization => 0.10,
            Self::OutlierRemoval => 0.12,
            Self::Scaling => 0.10,
            Self::Encoding => 0.14,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::ColumnNormalization => 0.0,
            Self::ColumnPruning => 0.04,
            Self::Imputation => 0.12,
            Self::DateNormalization => 0.28,
            Self::Deduplication => 0.42,
            Self::TextNormalization => 0.54,
            Self::OutlierRemoval => 0.64,
            Self::Scaling => 0.76,
            Self::Encoding => 0.86,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

impl fmt::Display for CleaningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Progress update emitted at stage boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during cleaning.
///
/// Implementations must be `Send + Sync` so a configured pipeline can be
/// shared across threads.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of every stage.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
static_assertions::assert_impl_all!(CleaningStage: Send, Sync, Copy);
