//! Progress reporting for the report pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use eda_report::Pipeline;
//!
//! let output = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run(&source)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a single report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStage {
    /// Decoding the input into a table
    Loading,
    /// Computing dataset facts
    Profiling,
    /// Drawing the requested charts
    Rendering,
    /// Laying out and serializing the document
    Assembling,
    /// Run finished with a document
    Complete,
    /// Run aborted with an error
    Failed,
}

impl ReportStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Profiling => "Profiling Dataset",
            Self::Rendering => "Rendering Charts",
            Self::Assembling => "Assembling Report",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage.
    ///
    /// The working stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.25,
            Self::Profiling => 0.15,
            Self::Rendering => 0.40,
            Self::Assembling => 0.20,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Overall progress when this stage starts.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Profiling => 0.25,
            Self::Rendering => 0.40,
            Self::Assembling => 0.80,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: ReportStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    /// Charts drawn so far, during rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: ReportStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        let progress = stage.base_progress() + stage.weight() * stage_progress;
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Progress update for an iterative step such as drawing chart `current` of `total`.
    pub fn with_items(
        stage: ReportStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            1.0
        };
        Self {
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(ReportStage::Complete, 1.0, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            progress: 0.0,
            stage_progress: 0.0,
            ..Self::new(ReportStage::Failed, 0.0, message)
        }
    }
}

/// Receives progress updates from a [`Pipeline`](crate::Pipeline) run.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved to a
/// worker thread while the reporter feeds a UI elsewhere.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // ==================== ProgressUpdate tests ====================

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(ReportStage::Rendering, 0.5, "Drawing...");
        assert_eq!(update.stage, ReportStage::Rendering);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.6).abs() < 1e-6);
        assert_eq!(update.message, "Drawing...");
        assert!(update.items_total.is_none());
    }

    #[test]
    fn test_progress_update_with_items() {
        let update = ProgressUpdate::with_items(ReportStage::Rendering, 1, 4, "Histogram of a");
        assert_eq!(update.stage_progress, 0.25);
        assert_eq!(update.items_processed, Some(1));
        assert_eq!(update.items_total, Some(4));
    }

    #[test]
    fn test_progress_update_with_no_items_is_done() {
        let update = ProgressUpdate::with_items(ReportStage::Rendering, 0, 0, "No charts");
        assert_eq!(update.stage_progress, 1.0);
    }

    #[test]
    fn test_progress_update_terminal_states() {
        let done = ProgressUpdate::complete("Done");
        assert_eq!(done.stage, ReportStage::Complete);
        assert_eq!(done.progress, 1.0);

        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, ReportStage::Failed);
        assert_eq!(failed.progress, 0.0);
    }

    // ==================== ReportStage tests ====================

    #[test]
    fn test_stage_weights_sum() {
        let total: f32 = [
            ReportStage::Loading,
            ReportStage::Profiling,
            ReportStage::Rendering,
            ReportStage::Assembling,
        ]
        .iter()
        .map(|s| s.weight())
        .sum();
        assert!((total - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_stage_bases_follow_weights() {
        let stages = [
            ReportStage::Loading,
            ReportStage::Profiling,
            ReportStage::Rendering,
            ReportStage::Assembling,
        ];
        for pair in stages.windows(2) {
            let expected = pair[0].base_progress() + pair[0].weight();
            assert!((pair[1].base_progress() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&ReportStage::Assembling).expect("Should serialize");
        assert_eq!(json, "\"assembling\"");

        let update = ProgressUpdate::with_items(ReportStage::Rendering, 2, 3, "Pie Chart of city");
        let json = serde_json::to_string(&update).expect("Should serialize");
        assert!(json.contains("\"stage\":\"rendering\""));
        assert!(json.contains("\"items_total\":3"));
    }

    // ==================== Reporter tests ====================

    #[test]
    fn test_closure_progress_reporter_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(ReportStage::Loading, 0.0, "Loading"));
        })
        .join()
        .expect("Thread should not panic");
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
