//! Per-column descriptive statistics.
//!
//! The shape of the statistics depends on the column kind, fixed when the table
//! was built: numeric columns get location and spread, categorical columns get
//! frequency facts, mixed columns only counts.

use crate::error::Result;
use crate::table::Table;
use crate::types::ColumnKind;
use serde::Serialize;
use std::collections::HashMap;

/// Statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric {
        count: usize,
        mean: Option<f64>,
        /// Sample standard deviation (ddof = 1); absent below two values.
        std: Option<f64>,
        min: Option<f64>,
        q25: Option<f64>,
        median: Option<f64>,
        q75: Option<f64>,
        max: Option<f64>,
    },
    Categorical {
        count: usize,
        unique: usize,
        /// Most frequent value; ties go to the value seen first.
        top: Option<String>,
        freq: usize,
    },
    Mixed {
        count: usize,
        unique: usize,
    },
    /// The column could not be summarized.
    Unavailable { reason: String },
}

impl ColumnStats {
    /// Number of non-missing values, when known.
    pub fn count(&self) -> Option<usize> {
        match self {
            Self::Numeric { count, .. }
            | Self::Categorical { count, .. }
            | Self::Mixed { count, .. } => Some(*count),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Statistics for a named column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub stats: ColumnStats,
}

/// Summarize one column according to its kind.
pub(crate) fn describe_column(table: &Table, column: &str, kind: ColumnKind) -> Result<ColumnStats> {
    match kind {
        ColumnKind::Numeric => {
            let values: Vec<f64> = table.numeric_values(column)?.into_iter().flatten().collect();
            Ok(describe_numeric(&values))
        }
        ColumnKind::Categorical => {
            let values = table.text_values(column)?;
            let unique = distinct_count(table, column)?;
            let (top, freq) = most_frequent(values.iter().flatten().map(String::as_str));
            Ok(ColumnStats::Categorical {
                count: values.iter().flatten().count(),
                unique,
                top,
                freq,
            })
        }
        ColumnKind::Mixed => {
            let values = table.text_values(column)?;
            Ok(ColumnStats::Mixed {
                count: values.iter().flatten().count(),
                unique: distinct_count(table, column)?,
            })
        }
    }
}

fn distinct_count(table: &Table, column: &str) -> Result<usize> {
    let series = table.series(column)?;
    Ok(series.drop_nulls().n_unique()?)
}

/// Numeric summary over the present values of a column.
pub(crate) fn describe_numeric(values: &[f64]) -> ColumnStats {
    let count = values.len();
    if count == 0 {
        return ColumnStats::Numeric {
            count,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    ColumnStats::Numeric {
        count,
        mean: Some(mean(values)),
        std: sample_std(values),
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; `None` for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile of sorted values with linear interpolation between neighbours.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Most frequent value and its count.
pub(crate) fn most_frequent<'a>(values: impl Iterator<Item = &'a str>) -> (Option<String>, usize) {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, (count, _))| (Some(value.to_string()), count))
        .unwrap_or((None, 0))
}
