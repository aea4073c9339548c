//! Custom error types for the cleaning pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Every error
//! that escapes a stage is wrapped with the stage that produced it, so callers
//! always receive a single error naming the failing stage and its cause.
//!
//! Errors are serializable so the CLI can emit them as JSON.

use crate::config::ConfigValidationError;
use crate::pipeline::CleaningStage;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Column names collide, or a column has the wrong kind for its role.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A column has no non-missing values to derive a fill value from.
    #[error("Failed to impute missing values in column '{column}': {reason}")]
    Imputation { column: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// An error raised while a specific stage was running.
    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: CleaningStage,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Attribute this error to the stage that raised it.
    ///
    /// Errors already attributed to a stage are returned unchanged.
    pub fn with_stage(self, stage: CleaningStage) -> Self {
        match self {
            already @ Self::StageFailed { .. } => already,
            other => Self::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage that failed, if the error has been attributed to one.
    pub fn stage(&self) -> Option<CleaningStage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Get a stable error code for machine consumption.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::Imputation { .. } => "IMPUTATION_ERROR",
            Self::InvalidConfig(_) => "CONFIGURATION_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::StageFailed { source, .. } => source.error_code(),
        }
    }

    /// Check if the error was caused by the input or configuration rather than
    /// an internal failure.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Schema(_) | Self::Imputation { .. } | Self::InvalidConfig(_) => true,
            Self::Polars(_) => false,
            Self::StageFailed { source, .. } => source.is_user_error(),
        }
    }
}

impl From<ConfigValidationError> for CleaningError {
    fn from(err: ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for attributing results to a stage.
pub trait ResultExt<T> {
    /// Attribute an error result to the given stage.
    fn in_stage(self, stage: CleaningStage) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn in_stage(self, stage: CleaningStage) -> Result<T> {
        self.map_err(|e| e.with_stage(stage))
    }
}
