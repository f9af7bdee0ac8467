//! Pipeline module.
//!
//! This module provides the end-to-end report pipeline and its progress types.

mod builder;
pub mod progress;

pub use builder::{ChartFailure, Pipeline, PipelineBuilder, PipelineOutput, RenderedChart};
pub use progress::{ClosureProgressReporter, ProgressReporter, ProgressUpdate, ReportStage};
