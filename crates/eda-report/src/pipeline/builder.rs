//! Report pipeline and its builder.
//!
//! A [`Pipeline`] runs one request end to end: load the source, profile the
//! table, draw the planned charts and assemble the PDF.

use crate::charts::{ChartPlan, ChartRenderer};
use crate::config::{ConfigValidationError, EdaConfig};
use crate::error::{EdaError, Result};
use crate::loader::{LoadReport, SourceLoader};
use crate::pipeline::progress::{
    ClosureProgressReporter, ProgressReporter, ProgressUpdate, ReportStage,
};
use crate::profiler::{Profile, ProfileAnalyzer, StatisticsSummary};
use crate::reporting::ReportAssembler;
use crate::types::{ChartSpec, DocumentBytes, ImageBytes, Source};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A chart that made it into the report.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub spec: ChartSpec,
    pub caption: String,
    pub image: ImageBytes,
}

/// A chart that was requested but could not be drawn.
///
/// The error keeps its original kind, wrapped with the chart title as context.
#[derive(Debug)]
pub struct ChartFailure {
    pub spec: ChartSpec,
    pub error: EdaError,
}

impl ChartFailure {
    /// Stable error code, e.g. `INVALID_CHART_REQUEST` or `RENDER_FAILED`
    pub fn code(&self) -> &'static str {
        self.error.error_code()
    }
}

/// Everything produced by one pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub load: LoadReport,
    pub profile: Profile,
    pub charts: Vec<RenderedChart>,
    pub failed_charts: Vec<ChartFailure>,
    pub document: DocumentBytes,
}

/// The load → profile → render → assemble pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use eda_report::{ChartPlan, Pipeline, RawInput, Source};
///
/// let input = RawInput::from_path("data.csv")?;
/// let output = Pipeline::builder()
///     .chart_plan(ChartPlan::Exhaustive)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(&Source::from(input))?;
///
/// std::fs::write("EDA_Report.pdf", output.document.as_bytes())?;
/// ```
pub struct Pipeline {
    config: EdaConfig,
    chart_plan: ChartPlan,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    loader: SourceLoader,
    analyzer: ProfileAnalyzer,
    renderer: ChartRenderer,
    assembler: ReportAssembler,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    /// Load `source` and produce the full report.
    ///
    /// Ingestion and assembly failures abort the run. Individual chart
    /// failures are collected in [`PipelineOutput::failed_charts`].
    pub fn run(&self, source: &Source) -> Result<PipelineOutput> {
        let start = Instant::now();
        let result = self.load(source).and_then(|load| self.report_internal(load));
        self.finish(result, start)
    }

    /// Produce the report for a table that is already loaded.
    pub fn report(&self, load: LoadReport) -> Result<PipelineOutput> {
        let start = Instant::now();
        let result = self.report_internal(load);
        self.finish(result, start)
    }

    fn finish(&self, result: Result<PipelineOutput>, start: Instant) -> Result<PipelineOutput> {
        match result {
            Ok(output) => {
                info!(
                    "Report finished in {:.2?}: {} chart(s), {} failed",
                    start.elapsed(),
                    output.charts.len(),
                    output.failed_charts.len()
                );
                self.report_progress(ProgressUpdate::complete("Report ready"));
                Ok(output)
            }
            Err(e) => {
                error!("Pipeline error [{}]: {}", e.error_code(), e);
                self.report_progress(ProgressUpdate::failed(e.user_message()));
                Err(e)
            }
        }
    }

    fn load(&self, source: &Source) -> Result<LoadReport> {
        self.report_progress(ProgressUpdate::new(
            ReportStage::Loading,
            0.0,
            "Loading data...",
        ));
        let load = self.loader.load(source)?;
        self.report_progress(ProgressUpdate::new(
            ReportStage::Loading,
            1.0,
            load.describe(),
        ));
        Ok(load)
    }

    fn report_internal(&self, load: LoadReport) -> Result<PipelineOutput> {
        self.report_progress(ProgressUpdate::new(
            ReportStage::Profiling,
            0.0,
            "Profiling dataset...",
        ));
        let profile = self.analyzer.analyze(&load.table);
        if let StatisticsSummary::Unavailable { reason } = &profile.statistics {
            warn!("Summary statistics unavailable: {}", reason);
        }
        self.report_progress(ProgressUpdate::new(
            ReportStage::Profiling,
            1.0,
            format!(
                "Profiled {} rows x {} columns",
                profile.row_count, profile.column_count
            ),
        ));

        let (charts, failed_charts) = self.render_charts(&load);

        self.report_progress(ProgressUpdate::new(
            ReportStage::Assembling,
            0.0,
            "Assembling report...",
        ));
        let captioned: Vec<(String, ImageBytes)> = charts
            .iter()
            .map(|c| (c.caption.clone(), c.image.clone()))
            .collect();
        let document = self.assembler.assemble(&profile, &captioned, &load.table)?;
        self.report_progress(ProgressUpdate::new(
            ReportStage::Assembling,
            1.0,
            format!("Report is {} bytes", document.len()),
        ));

        Ok(PipelineOutput {
            load,
            profile,
            charts,
            failed_charts,
            document,
        })
    }

    fn render_charts(&self, load: &LoadReport) -> (Vec<RenderedChart>, Vec<ChartFailure>) {
        let specs = self.chart_plan.specs(&load.table);
        let total = specs.len();
        debug!("Chart plan yields {} chart(s)", total);

        self.report_progress(ProgressUpdate::with_items(
            ReportStage::Rendering,
            0,
            total,
            "Rendering charts...",
        ));

        let mut charts = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (i, spec) in specs.into_iter().enumerate() {
            let drawn = self.renderer.render(&load.table, &spec).and_then(|image| {
                let caption = self.renderer.caption(&load.table, &spec)?;
                Ok((caption, image))
            });

            match drawn {
                Ok((caption, image)) => charts.push(RenderedChart {
                    spec: spec.clone(),
                    caption,
                    image,
                }),
                Err(e) => {
                    warn!("Skipping {}: {}", spec, e);
                    failures.push(ChartFailure {
                        error: e.with_context(spec.to_string()),
                        spec: spec.clone(),
                    });
                }
            }

            self.report_progress(ProgressUpdate::with_items(
                ReportStage::Rendering,
                i + 1,
                total,
                spec.to_string(),
            ));
        }
        (charts, failures)
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<EdaConfig>,
    chart_plan: Option<ChartPlan>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    pub fn config(mut self, config: EdaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Choose which charts the report carries. Default: [`ChartPlan::Defaults`].
    pub fn chart_plan(mut self, plan: ChartPlan) -> Self {
        self.chart_plan = Some(plan);
        self
    }

    /// Set a progress reporter, e.g. one that forwards events to a UI.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            loader: SourceLoader::new(config.clone()),
            analyzer: ProfileAnalyzer::from_config(&config),
            renderer: ChartRenderer::from_config(&config),
            assembler: ReportAssembler::from_config(&config),
            chart_plan: self.chart_plan.unwrap_or(ChartPlan::Defaults),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Interpretation;
    use crate::types::{MediaKind, RawInput, TextEncoding};
    use std::sync::Mutex;

    fn csv_source(text: &str) -> Source {
        Source::from(RawInput::new(text.as_bytes().to_vec(), MediaKind::Delimited))
    }

    fn small_config() -> EdaConfig {
        EdaConfig::builder().chart_size(200, 150).build().unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.chart_plan, ChartPlan::Defaults);
        assert!(pipeline.progress_reporter.is_none());
        assert_eq!(pipeline.config().duplicate_sample_limit, 20);
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let mut config = EdaConfig::default();
        config.encodings.clear();
        assert!(matches!(
            Pipeline::builder().config(config).build(),
            Err(ConfigValidationError::NoEncodings)
        ));
    }

    #[test]
    fn test_run_without_charts() {
        let output = Pipeline::builder()
            .chart_plan(ChartPlan::Skip)
            .build()
            .unwrap()
            .run(&csv_source("a,b\n1,x\n2,y\n1,x\n"))
            .unwrap();

        assert_eq!(
            output.load.interpretation,
            Interpretation::Delimited {
                encoding: TextEncoding::Utf8
            }
        );
        assert_eq!(output.profile.duplicate_row_count, 1);
        assert!(output.charts.is_empty());
        assert!(output.document.as_bytes().starts_with(b"%PDF"));
    }

    #[test]
    fn test_failed_chart_is_collected() {
        let output = Pipeline::builder()
            .config(small_config())
            .chart_plan(ChartPlan::Selected(vec![
                ChartSpec::bar("b"),
                ChartSpec::histogram("missing"),
            ]))
            .build()
            .unwrap()
            .run(&csv_source("a,b\n1,x\n2,y\n"))
            .unwrap();

        assert_eq!(output.charts.len(), 1);
        assert_eq!(output.charts[0].spec, ChartSpec::bar("b"));
        assert_eq!(output.failed_charts.len(), 1);
        let failure = &output.failed_charts[0];
        assert_eq!(failure.code(), "INVALID_CHART_REQUEST");
        assert!(failure.error.to_string().starts_with("Histogram of missing: "));
    }

    #[test]
    fn test_progress_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        Pipeline::builder()
            .config(small_config())
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap()
            .run(&csv_source("a,b\n1,x\n2,y\n"))
            .unwrap();

        let mut seen = stages.lock().unwrap().clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                ReportStage::Loading,
                ReportStage::Profiling,
                ReportStage::Rendering,
                ReportStage::Assembling,
                ReportStage::Complete,
            ]
        );
    }

    #[test]
    fn test_ingestion_failure_reports_failed() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        let err = Pipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap()
            .run(&Source::Url("https://example.com/data.csv".to_string()))
            .unwrap_err();

        assert!(err.is_ingestion());
        assert_eq!(stages.lock().unwrap().last(), Some(&ReportStage::Failed));
    }
}
