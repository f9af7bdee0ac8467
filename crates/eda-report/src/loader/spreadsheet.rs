//! Workbook attempt: the first worksheet of an xlsx or legacy xls file.

use super::{Interpretation, LoadAttempt, LoadReport};
use crate::error::Result;
use crate::table::RecordSet;
use crate::utils::normalize_cell;
use calamine::{DataType, Reader, Xls, Xlsx};
use chrono::{NaiveDate, TimeDelta};
use std::fmt::Display;
use std::io::{Cursor, Read, Seek};
use tracing::debug;

/// Reads the first worksheet; its first row is the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetAttempt;

impl LoadAttempt for SpreadsheetAttempt {
    fn name(&self) -> String {
        "spreadsheet".to_string()
    }

    fn attempt(&self, bytes: &[u8]) -> Result<Option<LoadReport>> {
        let loaded = match Xlsx::new(Cursor::new(bytes)) {
            Ok(workbook) => read_first_sheet(workbook),
            Err(e) => {
                debug!("Not an xlsx workbook: {}", e);
                match Xls::new(Cursor::new(bytes)) {
                    Ok(workbook) => read_first_sheet(workbook),
                    Err(e) => {
                        debug!("Not an xls workbook: {}", e);
                        None
                    }
                }
            }
        };

        let Some((sheet, records)) = loaded else {
            return Ok(None);
        };

        let skipped_rows = records.skipped();
        let table = records.into_table()?;
        Ok(Some(LoadReport {
            table,
            interpretation: Interpretation::Spreadsheet { sheet },
            skipped_rows,
        }))
    }
}

fn read_first_sheet<RS, R>(mut workbook: R) -> Option<(String, RecordSet)>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let sheet = workbook.sheet_names().first().cloned()?;
    let range = match workbook.worksheet_range(&sheet)? {
        Ok(range) => range,
        Err(e) => {
            debug!("Worksheet '{}' unreadable: {}", sheet, e);
            return None;
        }
    };

    let mut rows = range.rows();
    let header = rows.next()?;
    let mut records = RecordSet::new(
        header
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default()),
    );
    for row in rows {
        records.push_row(row.iter().map(cell_text).collect());
    }

    debug!(
        "Read {} rows from worksheet '{}'",
        records.row_count(),
        sheet
    );
    Some((sheet, records))
}

/// Render one cell as text; `None` for empty and error cells.
fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty | DataType::Error(_) => None,
        DataType::String(s) => normalize_cell(s),
        DataType::Int(v) => Some(v.to_string()),
        DataType::Float(v) => Some(v.to_string()),
        DataType::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        DataType::DateTime(serial) => excel_serial_to_iso(*serial).or_else(|| Some(serial.to_string())),
        other => Some(other.to_string()),
    }
}

/// Convert an Excel serial date (days since 1899-12-30) to `YYYY-MM-DD HH:MM:SS`.
fn excel_serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let timestamp = epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
    Some(timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
}
