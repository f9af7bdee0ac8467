//! Bar chart of category counts. The counting step is shared with the pie chart.

use super::{CHART_FONT_FAMILY, render_error, require_column, PALETTE};
use crate::error::{EdaError, Result};
use crate::table::Table;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::HashMap;

const MAX_AXIS_LABELS: usize = 20;

/// Number of occurrences of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Count the present values of a categorical column, most frequent first.
/// Categories with equal counts keep the order in which they first appear.
pub(crate) fn prepare(table: &Table, column: &str) -> Result<Vec<ValueCount>> {
    require_column(table, column, |kind| kind.is_categorical_like(), "categorical")?;

    let counts = value_counts(table.text_values(column)?.into_iter().flatten());
    if counts.is_empty() {
        return Err(EdaError::InvalidChartRequest(format!(
            "column '{column}' has no values to count"
        )));
    }
    Ok(counts)
}

pub fn value_counts(values: impl IntoIterator<Item = String>) -> Vec<ValueCount> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for value in values {
        match positions.get(&value) {
            Some(&position) => counts[position].count += 1,
            None => {
                positions.insert(value.clone(), counts.len());
                counts.push(ValueCount { value, count: 1 });
            }
        }
    }

    // stable sort keeps first-appearance order among ties
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub(crate) fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    column: &str,
    counts: &[ValueCount],
) -> Result<()> {
    let categories = counts.len();
    let y_max = counts.iter().map(|c| c.count).max().unwrap_or(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(root)
        .caption(title, (CHART_FONT_FAMILY, 20))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(44)
        .build_cartesian_2d(-0.5f64..(categories as f64 - 0.5), 0f64..y_max)
        .map_err(render_error)?;

    let label_for = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        counts
            .get(index as usize)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.min(MAX_AXIS_LABELS))
        .x_label_formatter(&label_for)
        .x_desc(column)
        .y_desc("Count")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, c)| {
            let center = i as f64;
            Rectangle::new(
                [(center - 0.4, 0.0), (center + 0.4, c.count as f64)],
                PALETTE[0].filled(),
            )
        }))
        .map_err(render_error)?;
    Ok(())
}

pub(crate) fn caption(counts: &[ValueCount], top: usize) -> String {
    let listed: Vec<String> = counts
        .iter()
        .take(top)
        .map(|c| format!("{} ({})", c.value, c.count))
        .collect();

    let mut text = format!("{} categories; most frequent: {}", counts.len(), listed.join(", "));
    if counts.len() > top {
        text.push_str(&format!(" and {} more", counts.len() - top));
    }
    text.push('.');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_value_counts_descending() {
        let counts = value_counts(strings(&["b", "a", "a", "c", "a", "b"]));
        let summary: Vec<(&str, usize)> = counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
        assert_eq!(summary, vec![("a", 3), ("b", 2), ("c", 1)]);
    }

    #[test]
    fn test_value_counts_ties_keep_first_appearance() {
        let counts = value_counts(strings(&["x", "y", "y", "x", "z"]));
        assert_eq!(counts[0].value, "x");
        assert_eq!(counts[1].value, "y");
    }

    #[test]
    fn test_caption_truncates() {
        let counts = value_counts(strings(&["a", "a", "b", "c"]));
        assert_eq!(
            caption(&counts, 2),
            "3 categories; most frequent: a (2), b (1) and 1 more."
        );
    }
}
