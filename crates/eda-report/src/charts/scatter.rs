//! Scatter plot of two numeric columns.

use super::{CHART_FONT_FAMILY, padded_range, render_error, require_column, PALETTE};
use crate::error::{EdaError, Result};
use crate::table::Table;
use crate::types::ColumnKind;
use plotters::coord::Shift;
use plotters::prelude::*;

/// Rows where both coordinates are present and finite.
pub(crate) fn prepare(table: &Table, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    for column in [x, y] {
        require_column(table, column, |kind| kind == ColumnKind::Numeric, "numeric")?;
    }

    let points: Vec<(f64, f64)> = table
        .numeric_values(x)?
        .into_iter()
        .zip(table.numeric_values(y)?)
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((a, b)),
            _ => None,
        })
        .collect();

    if points.is_empty() {
        return Err(EdaError::InvalidChartRequest(format!(
            "columns '{x}' and '{y}' share no complete rows"
        )));
    }
    Ok(points)
}

fn bounds(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = padded_range(min, max);
    let margin = (max - min) * 0.05;
    (min - margin, max + margin)
}

pub(crate) fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    x: &str,
    y: &str,
    points: &[(f64, f64)],
) -> Result<()> {
    let (x_min, x_max) = bounds(points.iter().map(|p| p.0));
    let (y_min, y_max) = bounds(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (CHART_FONT_FAMILY, 20))
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(44)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc(x)
        .y_desc(y)
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 3, PALETTE[0].mix(0.8).filled())),
        )
        .map_err(render_error)?;
    Ok(())
}

pub(crate) fn caption(points: &[(f64, f64)]) -> String {
    format!("{} points with both values present.", points.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RecordSet;

    #[test]
    fn test_only_complete_pairs_plotted() {
        let mut records = RecordSet::new(["x", "y"]);
        records.push_raw(["1", "2"]);
        records.push_raw(["", "3"]);
        records.push_raw(["4", "inf"]);
        records.push_raw(["5", "6"]);
        let table = records.into_table().unwrap();

        assert_eq!(prepare(&table, "x", "y").unwrap(), vec![(1.0, 2.0), (5.0, 6.0)]);
    }

    #[test]
    fn test_no_complete_pairs_rejected() {
        let mut records = RecordSet::new(["x", "y"]);
        records.push_raw(["1", ""]);
        records.push_raw(["", "2"]);
        let table = records.into_table().unwrap();

        let err = prepare(&table, "x", "y").unwrap_err();
        assert!(matches!(err, EdaError::InvalidChartRequest(_)));
    }

    #[test]
    fn test_bounds_are_padded() {
        let (lo, hi) = bounds([2.0, 2.0].into_iter());
        assert!(lo < 1.5 && hi > 2.5);
    }
}
