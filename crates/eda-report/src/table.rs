//! The normalized, immutable table produced by every loader.
//!
//! A [`Table`] wraps a Polars `DataFrame` together with the semantic
//! [`ColumnKind`] of each column. Kinds are inferred once, when the table is
//! built from raw records, and never re-inferred downstream.

use crate::error::{EdaError, Result};
use crate::types::ColumnKind;
use crate::utils::{format_number, normalize_cell, parse_number};
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Equal-length, uniquely named columns with a fixed semantic kind each.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    kinds: Vec<ColumnKind>,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            frame: DataFrame::empty(),
            kinds: Vec::new(),
        }
    }

    /// Number of rows; zero when the table has no columns.
    pub fn row_count(&self) -> usize {
        if self.kinds.is_empty() {
            0
        } else {
            self.frame.height()
        }
    }

    pub fn column_count(&self) -> usize {
        self.kinds.len()
    }

    /// (rows, columns), as shown in the report.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Column names paired with their kinds, in table order.
    pub fn columns(&self) -> Vec<(String, ColumnKind)> {
        self.column_names()
            .into_iter()
            .zip(self.kinds.iter().copied())
            .collect()
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let index = self.frame.get_column_index(name)?;
        self.kinds.get(index).copied()
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_where(|kind| kind == ColumnKind::Numeric)
    }

    /// Names of categorical and mixed columns, in table order.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_where(|kind| kind.is_categorical_like())
    }

    fn columns_where(&self, predicate: impl Fn(ColumnKind) -> bool) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|(_, kind)| predicate(*kind))
            .map(|(name, _)| name)
            .collect()
    }

    /// The underlying Polars frame (read-only).
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// The materialized series for a column.
    pub fn series(&self, name: &str) -> Result<&Series> {
        let column = self
            .frame
            .column(name)
            .map_err(|_| EdaError::InvalidChartRequest(format!("column '{name}' not found")))?;
        Ok(column.as_materialized_series())
    }

    /// Values of a numeric column, `None` for missing cells.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self.series(name)?;
        Ok(series.f64()?.into_iter().collect())
    }

    /// Values of a categorical or mixed column, `None` for missing cells.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.series(name)?;
        Ok(series
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }

    /// Display text of every cell of a column, whatever its kind.
    pub fn display_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        match self.column_kind(name) {
            Some(ColumnKind::Numeric) => Ok(self
                .numeric_values(name)?
                .into_iter()
                .map(|value| value.map(format_number))
                .collect()),
            Some(_) => self.text_values(name),
            None => Err(EdaError::InvalidChartRequest(format!(
                "column '{name}' not found"
            ))),
        }
    }

    /// Render the first `n` rows as strings, missing cells shown as `NaN`.
    pub fn preview(&self, n: usize) -> Result<TablePreview> {
        let columns = self.column_names();
        let take = n.min(self.row_count());
        let mut rows = vec![Vec::with_capacity(columns.len()); take];

        for name in &columns {
            let values = self.display_values(name)?;
            for (row, value) in rows.iter_mut().zip(values.into_iter().take(take)) {
                row.push(value.unwrap_or_else(|| "NaN".to_string()));
            }
        }

        Ok(TablePreview { columns, rows })
    }
}

/// The first rows of a table, rendered for a display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl fmt::Display for TablePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        write!(f, "{:index_width$}", "")?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name)?;
        }
        writeln!(f)?;

        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{:<index_width$}", i)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Record collection
// ============================================================================

/// Collects raw string records from any loader and turns them into a [`Table`].
///
/// Rows wider than the header are rejected and counted; shorter rows are
/// padded with missing cells.
#[derive(Debug, Clone)]
pub struct RecordSet {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    skipped: usize,
}

impl RecordSet {
    /// Start a record set; header names are normalized to be unique.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headers: normalize_headers(headers),
            rows: Vec::new(),
            skipped: 0,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Add a row of raw cells. Returns `false` (and counts the row as skipped)
    /// when it has more cells than the header.
    pub fn push_raw<I, S>(&mut self, cells: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let row: Vec<Option<String>> = cells
            .into_iter()
            .map(|cell| normalize_cell(cell.as_ref()))
            .collect();
        self.push_row(row)
    }

    /// Add an already-normalized row (`None` = missing cell).
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) -> bool {
        if row.len() > self.headers.len() {
            self.skipped += 1;
            return false;
        }
        row.resize(self.headers.len(), None);
        self.rows.push(row);
        true
    }

    /// Count a record that could not be read at all.
    pub fn mark_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows rejected as too wide or unreadable.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Infer a kind per column and build the table.
    pub fn into_table(self) -> Result<Table> {
        let RecordSet { headers, rows, .. } = self;
        if headers.is_empty() {
            return Ok(Table::empty());
        }

        let height = rows.len();
        let mut cells_by_column: Vec<Vec<Option<String>>> =
            vec![Vec::with_capacity(height); headers.len()];
        for row in rows {
            for (column, cell) in cells_by_column.iter_mut().zip(row) {
                column.push(cell);
            }
        }

        let mut columns = Vec::with_capacity(headers.len());
        let mut kinds = Vec::with_capacity(headers.len());

        for (name, cells) in headers.iter().zip(cells_by_column) {
            let kind = infer_kind(&cells);
            let series = match kind {
                ColumnKind::Numeric => {
                    let values: Vec<Option<f64>> = cells
                        .iter()
                        .map(|cell| {
                            cell.as_deref()
                                .and_then(parse_number)
                                .filter(|v| !v.is_nan())
                        })
                        .collect();
                    Series::new(name.as_str().into(), values)
                }
                ColumnKind::Categorical | ColumnKind::Mixed => {
                    Series::new(name.as_str().into(), cells)
                }
            };
            debug!("Column '{}' inferred as {}", name, kind.label());
            columns.push(Column::from(series));
            kinds.push(kind);
        }

        let frame = DataFrame::new(columns)?;
        Ok(Table { frame, kinds })
    }
}

/// Decide the semantic kind of a column from its normalized cells.
///
/// A column without any present value is numeric when it has rows (an all-NaN
/// column) and categorical when the table has no rows at all.
fn infer_kind(cells: &[Option<String>]) -> ColumnKind {
    let mut present = 0usize;
    let mut numeric = 0usize;
    for cell in cells.iter().flatten() {
        present += 1;
        if parse_number(cell).is_some() {
            numeric += 1;
        }
    }

    if present == 0 {
        if cells.is_empty() {
            ColumnKind::Categorical
        } else {
            ColumnKind::Numeric
        }
    } else if numeric == present {
        ColumnKind::Numeric
    } else if numeric == 0 {
        ColumnKind::Categorical
    } else {
        ColumnKind::Mixed
    }
}

/// Make header names usable and unique.
///
/// Blank names become `Unnamed: <index>`; repeated names get `.1`, `.2`, ...
fn normalize_headers<I, S>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let raw: Vec<String> = headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.as_ref();
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
