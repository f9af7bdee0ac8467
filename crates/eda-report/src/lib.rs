//! Exploratory Data Analysis Report Library
//!
//! Turns a tabular dataset (delimited text, a spreadsheet, a table inside a PDF
//! or a shared spreadsheet link) into a profile, a set of charts and a
//! downloadable PDF report.
//!
//! # Overview
//!
//! - **Loading**: an ordered cascade of text encodings and a spreadsheet
//!   fallback, PDF table detection, and shared-sheet links rewritten to their
//!   CSV export
//! - **Profiling**: shape, summary statistics, missing counts and duplicate rows
//! - **Charts**: histogram, bar, pie and scatter plots rendered to PNG
//! - **Reporting**: a fixed-layout PDF assembled from the profile and charts
//! - **Progress Reporting**: stage-by-stage updates through a callback
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eda_report::{ChartPlan, Pipeline, RawInput, Source};
//!
//! let input = RawInput::from_path("data.csv")?;
//!
//! let output = Pipeline::builder()
//!     .chart_plan(ChartPlan::Defaults)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&Source::from(input))?;
//!
//! println!("{}", output.load.describe());
//! println!("Duplicate rows: {}", output.profile.duplicate_row_count);
//! std::fs::write(output.document.file_name(), output.document.as_bytes())?;
//! ```
//!
//! # Using the components directly
//!
//! Each stage is usable on its own:
//!
//! ```rust,ignore
//! use eda_report::{ChartRenderer, ChartSpec, ProfileAnalyzer, ReportAssembler, SourceLoader};
//!
//! let load = SourceLoader::default().load(&source)?;
//! let profile = ProfileAnalyzer::default().analyze(&load.table);
//!
//! let renderer = ChartRenderer::default();
//! let spec = ChartSpec::histogram("age");
//! let chart = (renderer.caption(&load.table, &spec)?, renderer.render(&load.table, &spec)?);
//!
//! let pdf = ReportAssembler::default().assemble(&profile, &[chart], &load.table)?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use eda_report::EdaConfig;
//!
//! let config = EdaConfig::builder()
//!     .fetch_timeout_secs(10)
//!     .chart_size(800, 600)
//!     .report_title("Quarterly Sales")
//!     .build()?;
//! ```

pub mod charts;
pub mod config;
pub mod display;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{ChartPlan, ChartRenderer};
pub use config::{ConfigValidationError, EdaConfig, EdaConfigBuilder};
pub use display::{DisplaySurface, present, profile_facts};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use loader::{Interpretation, LoadCascade, LoadReport, SourceLoader};
pub use pipeline::{
    ChartFailure, ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineOutput,
    ProgressReporter, ProgressUpdate, RenderedChart, ReportStage,
};
pub use profiler::{ColumnStatistics, ColumnStats, Profile, ProfileAnalyzer, StatisticsSummary};
pub use reporting::{ReportAssembler, ReportDocument};
pub use table::{RecordSet, Table, TablePreview};
pub use types::{
    ChartKind, ChartSpec, ColumnKind, DocumentBytes, ImageBytes, MediaKind, PageSize, RawInput,
    Source, TextEncoding,
};
