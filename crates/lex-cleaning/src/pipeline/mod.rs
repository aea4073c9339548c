//! Pipeline module.
//!
//! This module provides the cleaning pipeline, its builder and progress
//! reporting.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
