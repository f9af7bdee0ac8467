//! Delimited-text attempts, one per text encoding.

use super::{Interpretation, LoadAttempt, LoadReport};
use crate::error::Result;
use crate::table::RecordSet;
use crate::types::TextEncoding;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Decode the bytes with one encoding and parse them as CSV.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedAttempt {
    encoding: TextEncoding,
    delimiter: u8,
}

impl DelimitedAttempt {
    pub fn new(encoding: TextEncoding, delimiter: u8) -> Self {
        Self {
            encoding,
            delimiter,
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Parse already-decoded text into records.
    ///
    /// Returns `None` when the text has no header columns. Records with more
    /// fields than the header are counted as skipped; shorter records are
    /// padded with missing cells.
    pub fn parse(&self, text: &str) -> Option<RecordSet> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = match reader.headers() {
            Ok(headers) if !headers.is_empty() => headers.clone(),
            Ok(_) => {
                debug!("No header columns under {}", self.encoding);
                return None;
            }
            Err(e) => {
                debug!("Header row unreadable under {}: {}", self.encoding, e);
                return None;
            }
        };

        let mut records = RecordSet::new(headers.iter());
        for result in reader.records() {
            match result {
                Ok(record) => {
                    records.push_raw(record.iter());
                }
                Err(e) => {
                    debug!("Skipping unreadable record: {}", e);
                    records.mark_skipped();
                }
            }
        }
        Some(records)
    }
}

impl LoadAttempt for DelimitedAttempt {
    fn name(&self) -> String {
        self.encoding.label().to_string()
    }

    fn attempt(&self, bytes: &[u8]) -> Result<Option<LoadReport>> {
        let Some(text) = decode(self.encoding, bytes) else {
            debug!("Input is not valid {}", self.encoding);
            return Ok(None);
        };

        if text.contains('\0') {
            debug!("Decoded {} text contains NUL bytes", self.encoding);
            return Ok(None);
        }

        let Some(records) = self.parse(&text) else {
            return Ok(None);
        };

        let skipped_rows = records.skipped();
        let table = records.into_table()?;
        Ok(Some(LoadReport {
            table,
            interpretation: Interpretation::Delimited {
                encoding: self.encoding,
            },
            skipped_rows,
        }))
    }
}

/// Decode bytes strictly; `None` means the bytes are not valid in `encoding`.
pub(crate) fn decode(encoding: TextEncoding, bytes: &[u8]) -> Option<Cow<'_, str>> {
    match encoding {
        TextEncoding::Utf8 => {
            if bytes.starts_with(UTF8_BOM) {
                return None;
            }
            UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
        }
        TextEncoding::Utf8Sig => {
            let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
            if had_errors { None } else { Some(text) }
        }
        TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
            Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
        }
        TextEncoding::Windows1252 => {
            WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
        }
    }
}
