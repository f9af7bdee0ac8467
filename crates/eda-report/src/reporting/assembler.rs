//! Report assembly.
//!
//! [`ReportAssembler`] lays out a profile and its charts in a fixed order
//! (title, shape, missing values, duplicates, statistics, charts) and writes
//! the result as one PDF.

use super::document::ReportDocument;
use crate::config::EdaConfig;
use crate::error::{EdaError, Result};
use crate::profiler::{ColumnStatistics, ColumnStats, Profile, StatisticsSummary};
use crate::table::Table;
use crate::types::{DocumentBytes, ImageBytes, PageSize};
use crate::utils::{format_number, format_optional};
use chrono::Local;
use tracing::{debug, info};

const SECTION_GAP: u32 = 12;

/// Orders profile facts and rendered charts into the fixed report layout.
///
/// The layout is: title, dataset shape and columns, missing values, duplicate
/// rows, summary statistics, then each chart as a caption followed by its image.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    title: String,
    page_size: PageSize,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::from_config(&EdaConfig::default())
    }
}

impl ReportAssembler {
    pub fn new(title: impl Into<String>, page_size: PageSize) -> Self {
        Self {
            title: title.into(),
            page_size,
        }
    }

    pub fn from_config(config: &EdaConfig) -> Self {
        Self::new(config.report_title.clone(), config.page_size)
    }

    /// Build and serialize the report in one step.
    pub fn assemble(
        &self,
        profile: &Profile,
        charts: &[(String, ImageBytes)],
        table: &Table,
    ) -> Result<DocumentBytes> {
        let document = self.build_document(profile, charts, table)?;
        let bytes = document.serialize()?;
        info!("Report assembled: {} bytes, {} chart(s)", bytes.len(), charts.len());
        Ok(bytes)
    }

    /// Build the block sequence without serializing it.
    ///
    /// Fails when the profile was computed for a table of a different shape.
    pub fn build_document(
        &self,
        profile: &Profile,
        charts: &[(String, ImageBytes)],
        table: &Table,
    ) -> Result<ReportDocument> {
        if profile.shape() != table.shape() || profile.column_names != table.column_names() {
            return Err(EdaError::AssemblyFailed(format!(
                "profile describes a {:?} table but the table is {:?}",
                profile.shape(),
                table.shape()
            )));
        }

        let mut doc = ReportDocument::new(self.page_size);

        doc.heading(&self.title, 1);
        doc.paragraph(format!(
            "Generated {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        doc.spacer(SECTION_GAP);

        doc.paragraph(format!("Shape: ({}, {})", profile.row_count, profile.column_count));
        doc.paragraph(format!("Columns: {}", format_column_list(&profile.column_names)));
        doc.spacer(SECTION_GAP);

        Self::missing_values_section(&mut doc, profile);
        Self::duplicates_section(&mut doc, profile);
        Self::statistics_section(&mut doc, profile);

        for (caption, image) in charts {
            doc.paragraph(caption.as_str());
            doc.image(image.clone());
            doc.spacer(SECTION_GAP);
        }

        debug!("Report document has {} blocks", doc.len());
        Ok(doc)
    }

    fn missing_values_section(doc: &mut ReportDocument, profile: &Profile) {
        doc.heading("Missing Values", 2);
        let rows = profile
            .missing_counts
            .iter()
            .map(|m| vec![m.column.clone(), m.missing.to_string()])
            .collect();
        doc.table(vec!["Column".to_string(), "Missing Count".to_string()], rows);
        doc.spacer(SECTION_GAP);
    }

    fn duplicates_section(doc: &mut ReportDocument, profile: &Profile) {
        doc.heading("Duplicate Values", 2);
        doc.paragraph(format!(
            "Number of duplicate rows: {}",
            profile.duplicate_row_count
        ));

        let sample = &profile.duplicate_rows;
        if !sample.rows.is_empty() {
            let mut header = vec!["Row".to_string()];
            header.extend(sample.columns.iter().cloned());
            let rows = sample
                .rows
                .iter()
                .map(|row| {
                    let mut cells = vec![row.index.to_string()];
                    cells.extend(row.values.iter().cloned());
                    cells
                })
                .collect();
            doc.table(header, rows);
            if sample.truncated {
                doc.paragraph(format!(
                    "Showing the first {} of {} duplicate rows.",
                    sample.rows.len(),
                    profile.duplicate_row_count
                ));
            }
        }
        doc.spacer(SECTION_GAP);
    }

    fn statistics_section(doc: &mut ReportDocument, profile: &Profile) {
        doc.heading("Summary Statistics", 2);

        let stats = match &profile.statistics {
            StatisticsSummary::Available(stats) => stats,
            StatisticsSummary::Unavailable { reason } => {
                doc.paragraph(format!("Could not generate statistics for this dataset: {reason}"));
                doc.spacer(SECTION_GAP);
                return;
            }
        };

        let numeric = numeric_rows(stats);
        if !numeric.is_empty() {
            doc.table(
                ["Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
                    .map(String::from)
                    .to_vec(),
                numeric,
            );
        }

        let categorical = categorical_rows(stats);
        if !categorical.is_empty() {
            doc.table(
                ["Column", "count", "unique", "top", "freq"]
                    .map(String::from)
                    .to_vec(),
                categorical,
            );
        }

        for entry in stats {
            if let ColumnStats::Unavailable { reason } = &entry.stats {
                doc.paragraph(format!(
                    "Statistics unavailable for column {}: {}",
                    entry.column, reason
                ));
            }
        }
        doc.spacer(SECTION_GAP);
    }
}

/// Quoted, bracketed column list: `['a', 'b']`.
fn format_column_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("[{}]", quoted.join(", "))
}

fn numeric_rows(stats: &[ColumnStatistics]) -> Vec<Vec<String>> {
    stats
        .iter()
        .filter_map(|entry| match &entry.stats {
            ColumnStats::Numeric {
                count,
                mean,
                std,
                min,
                q25,
                median,
                q75,
                max,
            } => Some(vec![
                entry.column.clone(),
                count.to_string(),
                format_optional(*mean),
                format_optional(*std),
                format_optional(*min),
                format_optional(*q25),
                format_optional(*median),
                format_optional(*q75),
                format_optional(*max),
            ]),
            _ => None,
        })
        .collect()
}

fn categorical_rows(stats: &[ColumnStatistics]) -> Vec<Vec<String>> {
    stats
        .iter()
        .filter_map(|entry| match &entry.stats {
            ColumnStats::Categorical {
                count,
                unique,
                top,
                freq,
            } => Some(vec![
                entry.column.clone(),
                count.to_string(),
                unique.to_string(),
                top.clone().unwrap_or_default(),
                format_number(*freq as f64),
            ]),
            ColumnStats::Mixed { count, unique } => Some(vec![
                entry.column.clone(),
                count.to_string(),
                unique.to_string(),
                String::new(),
                String::new(),
            ]),
            _ => None,
        })
        .collect()
}
