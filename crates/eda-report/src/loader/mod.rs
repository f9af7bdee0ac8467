//! Source loading: byte streams and shared-spreadsheet links to a [`Table`].
//!
//! Uploaded bytes go through an ordered cascade of [`LoadAttempt`]s that stops at
//! the first success:
//!
//! 1. PDF input is handed to the table extractor, whose errors are final.
//! 2. Anything else is decoded as delimited text under each configured encoding.
//! 3. If no text attempt produced a table, the bytes are read as a spreadsheet.
//!
//! Links are only accepted for shared spreadsheets; they are rewritten to the
//! CSV export form, fetched, and parsed with the same text cascade.

mod delimited;
mod pdf;
mod remote;
mod spreadsheet;

pub use delimited::DelimitedAttempt;
pub use pdf::extract_pdf_table;
pub use remote::{SharedSheetUrl, fetch_shared_sheet};
pub use spreadsheet::SpreadsheetAttempt;

use crate::config::EdaConfig;
use crate::error::{EdaError, Result};
use crate::table::Table;
use crate::types::{MediaKind, RawInput, Source, TextEncoding};
use serde::Serialize;
use tracing::{debug, info, warn};

/// How the winning attempt interpreted the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interpretation {
    /// Delimited text decoded with the given encoding.
    Delimited { encoding: TextEncoding },
    /// First worksheet of a workbook.
    Spreadsheet { sheet: String },
    /// First table detected in a PDF, on the given 1-based page.
    PdfTable { page: u32 },
    /// A shared spreadsheet fetched through its CSV export link.
    SharedSheet {
        export_url: String,
        encoding: TextEncoding,
    },
}

impl Interpretation {
    /// The user-facing success line.
    pub fn describe(&self) -> String {
        match self {
            Self::Delimited { encoding } => {
                format!("File loaded successfully as CSV using {} encoding", encoding)
            }
            Self::Spreadsheet { .. } => "File loaded successfully as Excel".to_string(),
            Self::PdfTable { .. } => "Loaded table from PDF successfully".to_string(),
            Self::SharedSheet { .. } => "Loaded Google Sheet successfully".to_string(),
        }
    }
}

/// A loaded table plus how it was obtained.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub table: Table,
    pub interpretation: Interpretation,
    /// Records dropped because their field count did not match the header.
    pub skipped_rows: usize,
}

impl LoadReport {
    pub fn describe(&self) -> String {
        self.interpretation.describe()
    }
}

/// One way of interpreting uploaded bytes.
///
/// `Ok(None)` and `Err(_)` both mean "not this one"; the cascade moves on.
pub trait LoadAttempt: Send + Sync {
    /// Label recorded when the attempt fails.
    fn name(&self) -> String;

    fn attempt(&self, bytes: &[u8]) -> Result<Option<LoadReport>>;
}

/// An ordered chain of load attempts.
pub struct LoadCascade {
    attempts: Vec<Box<dyn LoadAttempt>>,
}

impl LoadCascade {
    pub fn new(attempts: Vec<Box<dyn LoadAttempt>>) -> Self {
        Self { attempts }
    }

    /// The text-then-spreadsheet cascade used for non-PDF uploads.
    pub fn for_upload(config: &EdaConfig) -> Self {
        let mut attempts: Vec<Box<dyn LoadAttempt>> = config
            .encodings
            .iter()
            .map(|&encoding| {
                Box::new(DelimitedAttempt::new(encoding, config.delimiter)) as Box<dyn LoadAttempt>
            })
            .collect();
        attempts.push(Box::new(SpreadsheetAttempt));
        Self::new(attempts)
    }

    /// Text-only cascade used for fetched CSV exports.
    pub fn for_text(config: &EdaConfig) -> Self {
        Self::new(
            config
                .encodings
                .iter()
                .map(|&encoding| {
                    Box::new(DelimitedAttempt::new(encoding, config.delimiter))
                        as Box<dyn LoadAttempt>
                })
                .collect(),
        )
    }

    pub fn attempt_names(&self) -> Vec<String> {
        self.attempts.iter().map(|a| a.name()).collect()
    }

    /// Run attempts in order and return the first success.
    pub fn run(&self, bytes: &[u8]) -> Result<LoadReport> {
        let mut tried = Vec::with_capacity(self.attempts.len());

        for attempt in &self.attempts {
            let name = attempt.name();
            match attempt.attempt(bytes) {
                Ok(Some(report)) => {
                    debug!("Load attempt '{}' succeeded", name);
                    return Ok(report);
                }
                Ok(None) => debug!("Load attempt '{}' declined the input", name),
                Err(e) => debug!("Load attempt '{}' failed: {}", name, e),
            }
            tried.push(name);
        }

        Err(EdaError::AllEncodingsFailed { attempts: tried })
    }
}

/// Entry point for turning a [`Source`] into a [`LoadReport`].
#[derive(Debug, Clone)]
pub struct SourceLoader {
    config: EdaConfig,
}

impl SourceLoader {
    pub fn new(config: EdaConfig) -> Self {
        Self { config }
    }

    pub fn load(&self, source: &Source) -> Result<LoadReport> {
        let report = match source {
            Source::Raw(input) => self.load_raw(input)?,
            Source::Url(url) => self.load_url(url)?,
        };

        if report.skipped_rows > 0 {
            warn!(
                "Skipped {} malformed row(s) while loading",
                report.skipped_rows
            );
        }
        info!(
            "{} ({} rows x {} columns)",
            report.describe(),
            report.table.row_count(),
            report.table.column_count()
        );
        Ok(report)
    }

    fn load_raw(&self, input: &RawInput) -> Result<LoadReport> {
        debug!(
            "Loading {} bytes ({:?}) from {}",
            input.bytes().len(),
            input.kind(),
            input.name().unwrap_or("upload")
        );

        match input.kind() {
            MediaKind::Pdf => extract_pdf_table(input.bytes()),
            MediaKind::Delimited | MediaKind::Spreadsheet => {
                LoadCascade::for_upload(&self.config).run(input.bytes())
            }
        }
    }

    fn load_url(&self, url: &str) -> Result<LoadReport> {
        let shared = SharedSheetUrl::parse(url)?;
        let export_url = shared.export_url().to_string();
        info!("Fetching shared spreadsheet from {}", export_url);

        let bytes = fetch_shared_sheet(&shared, self.config.fetch_timeout())?;
        let report = LoadCascade::for_text(&self.config).run(&bytes)?;

        let encoding = match report.interpretation {
            Interpretation::Delimited { encoding } => encoding,
            _ => TextEncoding::Utf8,
        };
        Ok(LoadReport {
            interpretation: Interpretation::SharedSheet {
                export_url,
                encoding,
            },
            ..report
        })
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new(EdaConfig::default())
    }
}
