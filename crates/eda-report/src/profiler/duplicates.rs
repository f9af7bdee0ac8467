//! Exact duplicate-row detection.

use crate::error::Result;
use crate::table::Table;
use crate::types::ColumnKind;
use serde::Serialize;
use std::collections::HashSet;

/// Hashable form of one cell. Numbers compare by value, with `-0` equal to `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey {
    Missing,
    Number(u64),
    Text(String),
}

impl CellKey {
    fn number(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        Self::Number(value.to_bits())
    }
}

/// A duplicate row kept for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRow {
    /// Zero-based position in the table.
    pub index: usize,
    /// Display text of each cell, `NaN` for missing cells.
    pub values: Vec<String>,
}

/// Bounded sample of duplicate rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateSample {
    pub columns: Vec<String>,
    pub rows: Vec<DuplicateRow>,
    /// Whether more duplicates exist than the sample holds.
    pub truncated: bool,
}

/// Indices of rows equal in every cell to an earlier row.
pub(crate) fn duplicate_indices(table: &Table) -> Result<Vec<usize>> {
    let height = table.row_count();
    if height == 0 {
        return Ok(Vec::new());
    }

    let mut keys: Vec<Vec<CellKey>> = vec![Vec::with_capacity(table.column_count()); height];
    for (name, kind) in table.columns() {
        match kind {
            ColumnKind::Numeric => {
                for (row, value) in keys.iter_mut().zip(table.numeric_values(&name)?) {
                    row.push(value.map_or(CellKey::Missing, CellKey::number));
                }
            }
            ColumnKind::Categorical | ColumnKind::Mixed => {
                for (row, value) in keys.iter_mut().zip(table.text_values(&name)?) {
                    row.push(value.map_or(CellKey::Missing, CellKey::Text));
                }
            }
        }
    }

    let mut seen: HashSet<Vec<CellKey>> = HashSet::with_capacity(height);
    let mut duplicates = Vec::new();
    for (index, key) in keys.into_iter().enumerate() {
        if !seen.insert(key) {
            duplicates.push(index);
        }
    }
    Ok(duplicates)
}

/// Render the first `limit` duplicate rows.
pub(crate) fn sample_rows(table: &Table, indices: &[usize], limit: usize) -> Result<DuplicateSample> {
    let columns = table.column_names();
    let kept = &indices[..indices.len().min(limit)];

    let mut rows: Vec<DuplicateRow> = kept
        .iter()
        .map(|&index| DuplicateRow {
            index,
            values: Vec::with_capacity(columns.len()),
        })
        .collect();

    for name in &columns {
        let values = table.display_values(name)?;
        for row in rows.iter_mut() {
            let cell = values.get(row.index).cloned().flatten();
            row.values.push(cell.unwrap_or_else(|| "NaN".to_string()));
        }
    }

    Ok(DuplicateSample {
        columns,
        rows,
        truncated: indices.len() > limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RecordSet;

    fn table(rows: &[[&str; 2]]) -> Table {
        let mut records = RecordSet::new(["a", "b"]);
        for row in rows {
            records.push_raw(row.iter().copied());
        }
        records.into_table().unwrap()
    }

    #[test]
    fn test_first_occurrence_is_not_duplicate() {
        let t = table(&[["1", "x"], ["2", "y"], ["1", "x"], ["1", "x"]]);
        assert_eq!(duplicate_indices(&t).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_numeric_equality_by_value() {
        let t = table(&[["1.0", "x"], ["1", "x"], ["-0", "y"], ["0", "y"]]);
        assert_eq!(duplicate_indices(&t).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_missing_cells_match_each_other() {
        let t = table(&[["", "x"], ["NA", "x"], ["", "NULL"]]);
        assert_eq!(duplicate_indices(&t).unwrap(), vec![1]);
    }

    #[test]
    fn test_sample_is_bounded() {
        let t = table(&[["1", "x"], ["1", "x"], ["1", "x"], ["1", "x"]]);
        let indices = duplicate_indices(&t).unwrap();
        let sample = sample_rows(&t, &indices, 2).unwrap();
        assert_eq!(sample.rows.len(), 2);
        assert!(sample.truncated);
        assert_eq!(sample.rows[0].index, 1);
        assert_eq!(sample.rows[0].values, vec!["1", "x"]);
    }
}
