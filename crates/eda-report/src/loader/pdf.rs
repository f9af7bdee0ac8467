//! Table extraction from text-based PDFs.
//!
//! Pages are scanned in order. A table is the first run of at least two
//! consecutive lines that split into the same number (two or more) of cells,
//! cells being separated by tabs or runs of two or more spaces. The first line
//! of the run is the header. Only the first table is returned.

use super::LoadReport;
use crate::error::{EdaError, Result};

#[cfg(feature = "pdf-tables")]
use {
    super::Interpretation,
    crate::table::RecordSet,
    once_cell::sync::Lazy,
    regex::Regex,
    tracing::{debug, info},
};

#[cfg(feature = "pdf-tables")]
static CELL_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\t|\s{2,}").expect("Invalid regex"));

/// Extract the first table found in the PDF.
#[cfg(feature = "pdf-tables")]
pub fn extract_pdf_table(bytes: &[u8]) -> Result<LoadReport> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| EdaError::NoTableFound(format!("PDF could not be read: {e}")))?;

    for page in document.get_pages().keys().copied() {
        let text = match document.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                debug!("No text on page {}: {}", page, e);
                continue;
            }
        };

        if let Some(records) = find_table(&text) {
            info!(
                "Found table on page {} with {} columns",
                page,
                records.headers().len()
            );
            let skipped_rows = records.skipped();
            let table = records.into_table()?;
            return Ok(LoadReport {
                table,
                interpretation: Interpretation::PdfTable { page },
                skipped_rows,
            });
        }
    }

    Err(EdaError::NoTableFound(
        "no run of aligned multi-cell lines on any page".to_string(),
    ))
}

/// PDF extraction is compiled out; every PDF fails the same way.
#[cfg(not(feature = "pdf-tables"))]
pub fn extract_pdf_table(_bytes: &[u8]) -> Result<LoadReport> {
    Err(EdaError::ExtractionUnavailable)
}

#[cfg(feature = "pdf-tables")]
fn split_cells(line: &str) -> Vec<&str> {
    CELL_SEPARATOR
        .split(line.trim())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Locate the first aligned run of lines in extracted page text.
#[cfg(feature = "pdf-tables")]
fn find_table(text: &str) -> Option<RecordSet> {
    let lines: Vec<Vec<&str>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_cells)
        .collect();

    let mut start = 0;
    while start < lines.len() {
        let width = lines[start].len();
        let mut end = start + 1;
        while end < lines.len() && lines[end].len() == width {
            end += 1;
        }

        if width >= 2 && end - start >= 2 {
            let mut records = RecordSet::new(lines[start].iter().copied());
            for row in &lines[start + 1..end] {
                records.push_raw(row.iter().copied());
            }
            return Some(records);
        }
        start = end;
    }
    None
}


#[cfg(all(test, not(feature = "pdf-tables")))]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_unavailable() {
        let err = extract_pdf_table(b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, EdaError::ExtractionUnavailable));
    }
}
