//! Chart rendering.
//!
//! [`ChartRenderer`] maps a [`Table`] and a [`ChartSpec`] to PNG bytes. Each
//! chart kind lives in its own submodule, split into a pure data-preparation
//! step (validated against the column kinds) and a drawing step on an in-memory
//! bitmap. [`ChartPlan`] decides which charts a report gets.

mod bar;
mod histogram;
mod pie;
mod scatter;

pub use bar::ValueCount;
pub use histogram::{Bin, HistogramData};

use crate::config::EdaConfig;
use crate::error::{EdaError, Result};
use crate::table::Table;
use crate::types::{ChartSpec, ColumnKind, ImageBytes};
use once_cell::sync::Lazy;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use std::io::Cursor;
use tracing::debug;

/// Font family every chart draws its text with.
pub(crate) const CHART_FONT_FAMILY: &str = "sans-serif";

static CHART_FONT: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

static FONT_REGISTRATION: Lazy<std::result::Result<(), String>> = Lazy::new(|| {
    register_font(CHART_FONT_FAMILY, FontStyle::Normal, CHART_FONT)
        .map_err(|_| "bundled chart font could not be parsed".to_string())
});

/// Register the bundled font with plotters once per process.
fn ensure_chart_font() -> Result<()> {
    FONT_REGISTRATION.clone().map_err(EdaError::RenderFailed)
}

/// Qualitative palette for bars and wedges.
pub(crate) const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Renders charts as PNG images.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    show_density: bool,
    top_categories: usize,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::from_config(&EdaConfig::default())
    }
}

impl ChartRenderer {
    pub fn from_config(config: &EdaConfig) -> Self {
        Self {
            width: config.chart_width,
            height: config.chart_height,
            show_density: config.show_density,
            top_categories: config.top_categories_in_caption,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render one chart.
    ///
    /// Fails with `InvalidChartRequest` when a column is missing or has the wrong
    /// kind, and with `RenderFailed` when drawing or encoding fails.
    pub fn render(&self, table: &Table, spec: &ChartSpec) -> Result<ImageBytes> {
        debug!("Rendering {}", spec);
        let title = spec.to_string();
        match spec {
            ChartSpec::Histogram { column } => {
                let data = histogram::prepare(table, column, self.show_density)?;
                self.rasterize(|root| histogram::draw(root, &title, column, &data))
            }
            ChartSpec::Bar { column } => {
                let counts = bar::prepare(table, column)?;
                self.rasterize(|root| bar::draw(root, &title, column, &counts))
            }
            ChartSpec::Pie { column } => {
                let counts = bar::prepare(table, column)?;
                self.rasterize(|root| pie::draw(root, &title, &counts))
            }
            ChartSpec::Scatter { x, y } => {
                let points = scatter::prepare(table, x, y)?;
                self.rasterize(|root| scatter::draw(root, &title, x, y, &points))
            }
        }
    }

    /// Caption paragraph shown above the chart in the report.
    pub fn caption(&self, table: &Table, spec: &ChartSpec) -> Result<String> {
        let title = spec.to_string();
        let detail = match spec {
            ChartSpec::Histogram { column } => {
                histogram::caption(&histogram::prepare(table, column, false)?)
            }
            ChartSpec::Bar { column } => bar::caption(&bar::prepare(table, column)?, self.top_categories),
            ChartSpec::Pie { column } => pie::caption(&bar::prepare(table, column)?, self.top_categories),
            ChartSpec::Scatter { x, y } => scatter::caption(&scatter::prepare(table, x, y)?),
        };
        Ok(format!("{title}: {detail}"))
    }

    /// Draw into a fresh RGB buffer and encode it as PNG.
    fn rasterize<F>(&self, draw: F) -> Result<ImageBytes>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
    {
        ensure_chart_font()?;
        let (width, height) = (self.width, self.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;
            draw(&root)?;
            root.present().map_err(render_error)?;
        }
        encode_png(buffer, width, height)
    }
}

pub(crate) fn render_error(e: impl std::fmt::Display) -> EdaError {
    EdaError::RenderFailed(e.to_string())
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<ImageBytes> {
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| EdaError::RenderFailed("bitmap buffer has the wrong size".to_string()))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(render_error)?;
    Ok(ImageBytes::new(png, width, height))
}

/// Check that a column exists and has an accepted kind.
pub(crate) fn require_column(
    table: &Table,
    column: &str,
    accepted: impl Fn(ColumnKind) -> bool,
    expected: &str,
) -> Result<()> {
    match table.column_kind(column) {
        None => Err(EdaError::InvalidChartRequest(format!(
            "column '{column}' not found"
        ))),
        Some(kind) if accepted(kind) => Ok(()),
        Some(kind) => Err(EdaError::InvalidChartRequest(format!(
            "column '{column}' is {}, expected {expected}",
            kind.label()
        ))),
    }
}

/// Axis range that is never empty.
pub(crate) fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

// ============================================================================
// Chart planning
// ============================================================================

/// Which charts a report should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartPlan {
    /// Histogram of the first numeric column, bar and pie of the first
    /// categorical column, scatter of the first numeric column against itself.
    Defaults,
    /// Exactly these charts, in this order.
    Selected(Vec<ChartSpec>),
    /// Every applicable chart for every column, plus every pair of numeric
    /// columns as a scatter.
    Exhaustive,
    /// No charts.
    Skip,
}

impl ChartPlan {
    pub fn specs(&self, table: &Table) -> Vec<ChartSpec> {
        let numeric = table.numeric_columns();
        let categorical = table.categorical_columns();

        match self {
            Self::Skip => Vec::new(),
            Self::Selected(specs) => specs.clone(),
            Self::Defaults => {
                let mut specs = Vec::new();
                if let Some(column) = numeric.first() {
                    specs.push(ChartSpec::histogram(column));
                }
                if let Some(column) = categorical.first() {
                    specs.push(ChartSpec::bar(column));
                    specs.push(ChartSpec::pie(column));
                }
                if let Some(column) = numeric.first() {
                    specs.push(ChartSpec::scatter(column, column));
                }
                specs
            }
            Self::Exhaustive => {
                let mut specs: Vec<ChartSpec> = numeric.iter().map(ChartSpec::histogram).collect();
                for column in &categorical {
                    specs.push(ChartSpec::bar(column));
                    specs.push(ChartSpec::pie(column));
                }
                for (i, x) in numeric.iter().enumerate() {
                    for y in &numeric[i + 1..] {
                        specs.push(ChartSpec::scatter(x, y));
                    }
                }
                specs
            }
        }
    }
}
