//! Dataset profiling module.
//!
//! [`ProfileAnalyzer`] turns a [`Table`] into an immutable [`Profile`]: shape,
//! column names, per-column statistics, missing counts and duplicate rows.
//! Profiling never fails outright; a column that cannot be summarized degrades
//! to an `Unavailable` entry and the rest of the profile is still produced.

mod duplicates;
mod statistics;

pub use duplicates::{DuplicateRow, DuplicateSample};
pub use statistics::{ColumnStatistics, ColumnStats};
pub(crate) use statistics::{quantile, sample_std};

use crate::config::EdaConfig;
use crate::error::{EdaError, Result};
use crate::table::Table;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Summary statistics for the whole table, or why there are none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StatisticsSummary {
    Available(Vec<ColumnStatistics>),
    Unavailable { reason: String },
}

impl StatisticsSummary {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Missing-cell count for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Descriptive facts about a table, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    pub statistics: StatisticsSummary,
    pub missing_counts: Vec<MissingCount>,
    pub duplicate_row_count: usize,
    pub duplicate_rows: DuplicateSample,
}

static_assertions::assert_impl_all!(Profile: Send, Sync);

impl Profile {
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.column_count)
    }

    pub fn missing_count(&self, column: &str) -> Option<usize> {
        self.missing_counts
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.missing)
    }

    /// Statistics, or `AnalysisUnavailable` when none could be computed.
    pub fn require_statistics(&self) -> Result<&[ColumnStatistics]> {
        match &self.statistics {
            StatisticsSummary::Available(stats) => Ok(stats),
            StatisticsSummary::Unavailable { reason } => {
                Err(EdaError::AnalysisUnavailable(reason.clone()))
            }
        }
    }

    pub fn column_statistics(&self, column: &str) -> Option<&ColumnStats> {
        match &self.statistics {
            StatisticsSummary::Available(stats) => stats
                .iter()
                .find(|s| s.column == column)
                .map(|s| &s.stats),
            StatisticsSummary::Unavailable { .. } => None,
        }
    }
}

/// Computes a [`Profile`] from a [`Table`].
#[derive(Debug, Clone)]
pub struct ProfileAnalyzer {
    duplicate_sample_limit: usize,
}

impl Default for ProfileAnalyzer {
    fn default() -> Self {
        Self {
            duplicate_sample_limit: EdaConfig::default().duplicate_sample_limit,
        }
    }
}

impl ProfileAnalyzer {
    pub fn new(duplicate_sample_limit: usize) -> Self {
        Self {
            duplicate_sample_limit,
        }
    }

    pub fn from_config(config: &EdaConfig) -> Self {
        Self::new(config.duplicate_sample_limit)
    }

    /// Profile a table.
    ///
    /// This function summarizes each column, counts missing cells and detects
    /// exact duplicate rows.
    pub fn analyze(&self, table: &Table) -> Profile {
        let (row_count, column_count) = table.shape();
        info!("Profiling table with {} rows x {} columns", row_count, column_count);

        let statistics = Self::summarize(table);
        let missing_counts = Self::count_missing(table);

        let (duplicate_row_count, duplicate_rows) = match self.find_duplicates(table) {
            Ok(found) => found,
            Err(e) => {
                warn!("Duplicate detection failed: {}", e);
                (0, DuplicateSample::default())
            }
        };
        debug!("Found {} duplicate row(s)", duplicate_row_count);

        Profile {
            row_count,
            column_count,
            column_names: table.column_names(),
            statistics,
            missing_counts,
            duplicate_row_count,
            duplicate_rows,
        }
    }

    fn summarize(table: &Table) -> StatisticsSummary {
        if table.column_count() == 0 {
            return StatisticsSummary::Unavailable {
                reason: "the table has no columns".to_string(),
            };
        }

        let stats = table
            .columns()
            .into_iter()
            .map(|(column, kind)| {
                let stats = statistics::describe_column(table, &column, kind).unwrap_or_else(|e| {
                    warn!("Could not summarize column '{}': {}", column, e);
                    ColumnStats::Unavailable {
                        reason: e.to_string(),
                    }
                });
                ColumnStatistics { column, stats }
            })
            .collect();
        StatisticsSummary::Available(stats)
    }

    fn count_missing(table: &Table) -> Vec<MissingCount> {
        table
            .column_names()
            .into_iter()
            .map(|column| {
                let missing = table.series(&column).map(|s| s.null_count()).unwrap_or(0);
                MissingCount { column, missing }
            })
            .collect()
    }

    fn find_duplicates(&self, table: &Table) -> Result<(usize, DuplicateSample)> {
        let indices = duplicates::duplicate_indices(table)?;
        let sample = duplicates::sample_rows(table, &indices, self.duplicate_sample_limit)?;
        Ok((indices.len(), sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RecordSet;
    use pretty_assertions::assert_eq;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut records = RecordSet::new(headers.iter().copied());
        for row in rows {
            records.push_raw(row.iter().copied());
        }
        records.into_table().unwrap()
    }

    #[test]
    fn test_profile_simple_table() {
        let t = table(&["a", "b"], &[&["1", "x"], &["2", "y"], &["1", "x"]]);
        let profile = ProfileAnalyzer::default().analyze(&t);

        assert_eq!(profile.shape(), (3, 2));
        assert_eq!(profile.column_names, vec!["a", "b"]);
        assert_eq!(profile.missing_count("a"), Some(0));
        assert_eq!(profile.missing_count("b"), Some(0));
        assert_eq!(profile.duplicate_row_count, 1);
        assert_eq!(profile.duplicate_rows.rows[0].index, 2);
        assert!(profile.statistics.is_available());
    }

    #[test]
    fn test_missing_counts() {
        let t = table(&["a", "b"], &[&["", "x"], &["NA", ""], &["3", "z"]]);
        let profile = ProfileAnalyzer::default().analyze(&t);
        assert_eq!(
            profile.missing_counts,
            vec![
                MissingCount {
                    column: "a".to_string(),
                    missing: 2
                },
                MissingCount {
                    column: "b".to_string(),
                    missing: 1
                },
            ]
        );
    }

    #[test]
    fn test_no_columns_marks_statistics_unavailable() {
        let profile = ProfileAnalyzer::default().analyze(&Table::empty());
        assert_eq!(profile.row_count, 0);
        assert!(!profile.statistics.is_available());
        let err = profile.require_statistics().unwrap_err();
        assert_eq!(err.error_code(), "ANALYSIS_UNAVAILABLE");
    }

    #[test]
    fn test_column_statistics_lookup() {
        let t = table(&["n"], &[&["2"], &["4"]]);
        let profile = ProfileAnalyzer::default().analyze(&t);
        match profile.column_statistics("n") {
            Some(ColumnStats::Numeric { mean, .. }) => assert_eq!(*mean, Some(3.0)),
            other => panic!("unexpected stats: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_sample_limit() {
        let row: &[&str] = &["1"];
        let rows = vec![row; 30];
        let t = table(&["a"], &rows);
        let profile = ProfileAnalyzer::new(5).analyze(&t);
        assert_eq!(profile.duplicate_row_count, 29);
        assert_eq!(profile.duplicate_rows.rows.len(), 5);
        assert!(profile.duplicate_rows.truncated);
    }

    #[test]
    fn test_profile_serializes() {
        let t = table(&["a"], &[&["1"]]);
        let profile = ProfileAnalyzer::default().analyze(&t);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"row_count\":1"));
        assert!(json.contains("\"status\":\"available\""));
    }
}
