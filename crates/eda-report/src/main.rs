//! CLI entry point for the EDA report generator.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use eda_report::utils::truncate_str;
use eda_report::{
    ChartPlan, ChartSpec, DisplaySurface, EdaConfig, EdaConfigBuilder, EdaError, ImageBytes,
    MediaKind, Pipeline, PipelineOutput, RawInput, Source, TablePreview, present,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// CLI-compatible input kind
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliInputKind {
    /// Comma-separated text
    Csv,
    /// Excel workbook (xlsx or xls)
    Excel,
    /// Table inside a PDF
    Pdf,
}

impl From<CliInputKind> for MediaKind {
    fn from(cli: CliInputKind) -> Self {
        match cli {
            CliInputKind::Csv => MediaKind::Delimited,
            CliInputKind::Excel => MediaKind::Spreadsheet,
            CliInputKind::Pdf => MediaKind::Pdf,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory data analysis report generator",
    long_about = "Profiles a dataset, draws charts and writes a PDF report.\n\n\
                  EXAMPLES:\n  \
                  # Default charts for a CSV file\n  \
                  eda-report -i data.csv\n\n  \
                  # Pick charts explicitly\n  \
                  eda-report -i sales.xlsx --histogram price --pie region --scatter price qty\n\n  \
                  # A shared spreadsheet, JSON summary only\n  \
                  eda-report --url 'https://docs.google.com/spreadsheets/d/<id>/edit#gid=0' --json"
)]
struct Args {
    /// Path to a CSV, Excel or PDF file
    #[arg(short, long, required_unless_present = "url", conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Shared spreadsheet link
    #[arg(short, long)]
    url: Option<String>,

    /// Where to write the PDF report
    #[arg(short, long, default_value = "EDA_Report.pdf")]
    output: PathBuf,

    /// Override the input kind instead of inferring it from the file
    #[arg(long, value_enum)]
    kind: Option<CliInputKind>,

    /// Histogram of a numeric column (repeatable)
    #[arg(long, value_name = "COLUMN")]
    histogram: Vec<String>,

    /// Bar chart of a categorical column (repeatable)
    #[arg(long, value_name = "COLUMN")]
    bar: Vec<String>,

    /// Pie chart of a categorical column (repeatable)
    #[arg(long, value_name = "COLUMN")]
    pie: Vec<String>,

    /// Scatter plot of two numeric columns (repeatable)
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    scatter: Vec<String>,

    /// Draw every applicable chart for every column
    #[arg(long, conflicts_with = "no_charts")]
    all_charts: bool,

    /// Do not draw any charts
    #[arg(long)]
    no_charts: bool,

    /// Also write each chart as a PNG into this directory
    #[arg(long)]
    charts_dir: Option<PathBuf>,

    /// Timeout for fetching a shared spreadsheet, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// JSON file with an `EdaConfig`; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output a JSON summary to stdout instead of the terminal view
    ///
    /// Disables all logs so stdout carries only JSON.
    #[arg(long)]
    json: bool,

    /// Number of table rows to preview
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn chart_plan(&self) -> ChartPlan {
        if self.no_charts {
            return ChartPlan::Skip;
        }
        if self.all_charts {
            return ChartPlan::Exhaustive;
        }

        let mut specs: Vec<ChartSpec> = self.histogram.iter().map(ChartSpec::histogram).collect();
        specs.extend(self.bar.iter().map(ChartSpec::bar));
        specs.extend(self.pie.iter().map(ChartSpec::pie));
        specs.extend(
            self.scatter
                .chunks_exact(2)
                .map(|pair| ChartSpec::scatter(&pair[0], &pair[1])),
        );

        if specs.is_empty() {
            ChartPlan::Defaults
        } else {
            ChartPlan::Selected(specs)
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = load_config(&args)?;
    let source = build_source(&args)?;

    let pipeline = Pipeline::builder()
        .config(config)
        .chart_plan(args.chart_plan())
        .on_progress(|update| {
            debug!(
                "[{:>3.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?;

    let output = match pipeline.run(&source) {
        Ok(output) => output,
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            } else {
                TerminalDisplay.show_error(&e);
            }
            return Err(anyhow!("Report generation failed: {}", e));
        }
    };

    std::fs::write(&args.output, output.document.as_bytes())
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;
    info!("Report written to: {}", args.output.display());

    if let Some(dir) = &args.charts_dir {
        write_chart_images(dir, &output)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_summary(&output, &args.output))?);
    } else {
        present(&mut TerminalDisplay, &output, args.preview_rows)?;
        println!();
        println!("Report: {}", args.output.display());
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<EdaConfig> {
    let mut builder = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: EdaConfig = serde_json::from_str(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            EdaConfigBuilder::from_config(config)
        }
        None => EdaConfig::builder(),
    };

    if let Some(secs) = args.timeout {
        builder = builder.fetch_timeout_secs(secs);
    }
    Ok(builder.build()?)
}

fn build_source(args: &Args) -> Result<Source> {
    if let Some(url) = &args.url {
        return Ok(Source::Url(url.clone()));
    }

    let path = args
        .input
        .as_ref()
        .ok_or_else(|| anyhow!("Either --input or --url is required"))?;
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }

    let input = match args.kind {
        Some(kind) => {
            let bytes = std::fs::read(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            RawInput::new(bytes, kind.into()).with_name(name)
        }
        None => RawInput::from_path(path)?,
    };
    info!("Loading {} ({:?})", path.display(), input.kind());
    Ok(Source::from(input))
}

fn write_chart_images(dir: &Path, output: &PipelineOutput) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (i, chart) in output.charts.iter().enumerate() {
        let stem: String = chart
            .spec
            .to_string()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let path = dir.join(format!("{:02}_{}.png", i + 1, stem));
        std::fs::write(&path, chart.image.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Chart written to: {}", path.display());
    }
    info!("{} chart image(s) written to {}", output.charts.len(), dir.display());
    Ok(())
}

fn json_summary(output: &PipelineOutput, report_path: &Path) -> serde_json::Value {
    serde_json::json!({
        "report": report_path.display().to_string(),
        "report_bytes": output.document.len(),
        "load": {
            "message": output.load.describe(),
            "interpretation": output.load.interpretation,
            "skipped_rows": output.load.skipped_rows,
        },
        "profile": output.profile,
        "charts": output.charts.iter().map(|c| serde_json::json!({
            "chart": c.spec,
            "caption": c.caption,
        })).collect::<Vec<_>>(),
        "failed_charts": output.failed_charts.iter().map(|f| serde_json::json!({
            "chart": f.spec,
            "code": f.code(),
            "message": f.error.to_string(),
        })).collect::<Vec<_>>(),
    })
}

/// Plain-text display on stdout.
///
/// Note: This uses `println!` intentionally for user-facing CLI output,
/// which must stay visible regardless of log level.
struct TerminalDisplay;

impl DisplaySurface for TerminalDisplay {
    fn show_preview(&mut self, preview: &TablePreview) {
        println!();
        println!("PREVIEW");
        println!("{}", "-".repeat(40));
        print!("{preview}");
    }

    fn show_facts(&mut self, facts: &[(String, String)]) {
        println!();
        for (label, value) in facts {
            println!("{:<16} {}", format!("{label}:"), truncate_str(value, 100));
        }
    }

    fn show_image(&mut self, caption: &str, image: &ImageBytes) {
        println!();
        println!("{caption}");
        println!(
            "  [{}x{} PNG, {} bytes]",
            image.width(),
            image.height(),
            image.as_bytes().len()
        );
    }

    fn show_error(&mut self, e: &EdaError) {
        error!("{}", e);
        eprintln!("Error [{}]: {}", e.error_code(), e.user_message());
    }
}
