//! Histogram with an optional smoothed density overlay.

use super::{CHART_FONT_FAMILY, padded_range, render_error, require_column, PALETTE};
use crate::error::{EdaError, Result};
use crate::profiler::{quantile, sample_std};
use crate::table::Table;
use crate::types::ColumnKind;
use crate::utils::format_number;
use plotters::coord::Shift;
use plotters::prelude::*;

const MAX_BINS: usize = 500;
const DENSITY_POINTS: usize = 200;
const DENSITY_COLOR: RGBColor = RGBColor(214, 39, 40);

/// One histogram bar covering `[start, end)` (the last bin is closed).
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Everything needed to draw a histogram.
#[derive(Debug, Clone)]
pub struct HistogramData {
    pub bins: Vec<Bin>,
    /// Density curve scaled to counts, as (x, y) points.
    pub density: Option<Vec<(f64, f64)>>,
    pub value_count: usize,
    pub min: f64,
    pub max: f64,
}

pub(crate) fn prepare(table: &Table, column: &str, with_density: bool) -> Result<HistogramData> {
    require_column(table, column, |kind| kind == ColumnKind::Numeric, "numeric")?;

    let values: Vec<f64> = table
        .numeric_values(column)?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(EdaError::InvalidChartRequest(format!(
            "column '{column}' has no numeric values to plot"
        )));
    }

    let bins = auto_bins(&values);
    let density = if with_density {
        let width = bins.first().map(|b| b.end - b.start).unwrap_or(1.0);
        kde_curve(&values, width)
    } else {
        None
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(HistogramData {
        bins,
        density,
        value_count: values.len(),
        min,
        max,
    })
}

/// Equal-width bins, choosing the smaller of the Sturges and
/// Freedman-Diaconis widths (Sturges alone when the IQR is zero).
pub fn auto_bins(values: &[f64]) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;
    let (data_min, data_max) = (sorted[0], sorted[sorted.len() - 1]);
    let spread = data_max - data_min;

    let sturges = spread / (n.log2() + 1.0);
    let iqr = match (quantile(&sorted, 0.75), quantile(&sorted, 0.25)) {
        (Some(q75), Some(q25)) => q75 - q25,
        _ => 0.0,
    };
    let freedman_diaconis = 2.0 * iqr / n.cbrt();
    let width = if freedman_diaconis > 0.0 {
        freedman_diaconis.min(sturges)
    } else {
        sturges
    };

    let (first, last) = padded_range(data_min, data_max);
    let count = if width > 0.0 {
        (((last - first) / width).ceil() as usize).clamp(1, MAX_BINS)
    } else {
        1
    };
    let step = (last - first) / count as f64;

    let mut bins: Vec<Bin> = (0..count)
        .map(|i| Bin {
            start: first + step * i as f64,
            end: if i + 1 == count {
                last
            } else {
                first + step * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &value in values {
        let index = (((value - first) / step).floor() as usize).min(count - 1);
        bins[index].count += 1;
    }
    bins
}

/// Gaussian kernel density with Scott's bandwidth, scaled so the curve sits on
/// the same axis as bin counts. `None` when the values have no spread.
fn kde_curve(values: &[f64], bin_width: f64) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    let std = sample_std(values).filter(|&std| std > 0.0)?;
    let bandwidth = std * (n as f64).powf(-0.2);

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let norm = (2.0 * std::f64::consts::PI).sqrt() * bandwidth;
    let scale = n as f64 * bin_width;

    let curve = (0..DENSITY_POINTS)
        .map(|i| {
            let x = min + (max - min) * i as f64 / (DENSITY_POINTS - 1) as f64;
            let density: f64 = values
                .iter()
                .map(|&v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp() / norm
                })
                .sum::<f64>()
                / n as f64;
            (x, density * scale)
        })
        .collect();
    Some(curve)
}

pub(crate) fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    column: &str,
    data: &HistogramData,
) -> Result<()> {
    let (x_min, x_max) = match (data.bins.first(), data.bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => padded_range(data.min, data.max),
    };
    let tallest_bar = data.bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let tallest_curve = data
        .density
        .iter()
        .flatten()
        .map(|&(_, y)| y)
        .fold(0.0, f64::max);
    let y_max = tallest_bar.max(tallest_curve).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(title, (CHART_FONT_FAMILY, 20))
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(44)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("Count")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(data.bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.start, 0.0), (bin.end, bin.count as f64)],
                PALETTE[0].mix(0.7).filled(),
            )
        }))
        .map_err(render_error)?;

    chart
        .draw_series(data.bins.iter().map(|bin| {
            Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], WHITE.stroke_width(1))
        }))
        .map_err(render_error)?;

    if let Some(curve) = &data.density {
        chart
            .draw_series(LineSeries::new(
                curve.iter().copied(),
                DENSITY_COLOR.stroke_width(2),
            ))
            .map_err(render_error)?;
    }
    Ok(())
}

pub(crate) fn caption(data: &HistogramData) -> String {
    format!(
        "{} values in {} bins, ranging from {} to {}.",
        data.value_count,
        data.bins.len(),
        format_number(data.min),
        format_number(data.max)
    )
}
