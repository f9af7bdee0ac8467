//! Shared-spreadsheet links.
//!
//! Only Google Sheets links are accepted. Anything else is rejected before any
//! network traffic happens.

use crate::error::{EdaError, Result};
use std::time::Duration;
use url::Url;

const SHEETS_HOST: &str = "docs.google.com";
const EXPORT_MARKER: &str = "export?format=csv";

/// A validated shared-spreadsheet link and its CSV export form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSheetUrl {
    original: String,
    export: String,
}

impl SharedSheetUrl {
    /// Validate a link and compute its CSV export URL.
    ///
    /// * links already containing `export?format=csv` are kept as-is
    /// * `/edit#gid=N` becomes `/export?format=csv&gid=N`
    /// * any other `/edit...` suffix becomes `/export?format=csv`
    pub fn parse(link: &str) -> Result<Self> {
        let link = link.trim();
        let parsed = Url::parse(link)
            .map_err(|e| EdaError::UnsupportedSource(format!("invalid link '{link}': {e}")))?;

        if parsed.host_str() != Some(SHEETS_HOST) {
            return Err(EdaError::UnsupportedSource(format!(
                "'{link}' is not a Google Sheets link"
            )));
        }

        let export = if link.contains(EXPORT_MARKER) {
            link.to_string()
        } else if link.contains("/edit#gid=") {
            link.replacen("/edit#gid=", "/export?format=csv&gid=", 1)
        } else if let Some(index) = link.find("/edit") {
            format!("{}/{}", &link[..index], EXPORT_MARKER)
        } else {
            link.to_string()
        };

        Ok(Self {
            original: link.to_string(),
            export,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn export_url(&self) -> &str {
        &self.export
    }
}

/// Download the CSV export of a shared sheet.
#[cfg(feature = "remote")]
pub fn fetch_shared_sheet(url: &SharedSheetUrl, timeout: Duration) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EdaError::RemoteFetchFailed(e.to_string()))?;

    let response = client
        .get(url.export_url())
        .send()
        .map_err(|e| EdaError::RemoteFetchFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(EdaError::RemoteFetchFailed(format!(
            "server answered {status} for {}",
            url.export_url()
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| EdaError::RemoteFetchFailed(e.to_string()))?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "remote"))]
pub fn fetch_shared_sheet(url: &SharedSheetUrl, _timeout: Duration) -> Result<Vec<u8>> {
    Err(EdaError::RemoteFetchFailed(format!(
        "remote fetching is not compiled in; cannot download {}",
        url.export_url()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "https://docs.google.com/spreadsheets/d/abc123";

    #[test]
    fn test_edit_gid_rewritten() {
        let url = SharedSheetUrl::parse(&format!("{SHEET}/edit#gid=42")).unwrap();
        assert_eq!(url.export_url(), format!("{SHEET}/export?format=csv&gid=42"));
    }

    #[test]
    fn test_other_edit_suffix_rewritten() {
        let url = SharedSheetUrl::parse(&format!("{SHEET}/edit?usp=sharing")).unwrap();
        assert_eq!(url.export_url(), format!("{SHEET}/export?format=csv"));
    }

    #[test]
    fn test_export_link_kept() {
        let link = format!("{SHEET}/export?format=csv&gid=0");
        let url = SharedSheetUrl::parse(&link).unwrap();
        assert_eq!(url.export_url(), link);
        assert_eq!(url.original(), link);
    }

    #[test]
    fn test_other_hosts_rejected() {
        for link in [
            "https://example.com/sheet.csv",
            "https://docs.google.com.evil.test/spreadsheets/d/x/edit",
            "not a url",
        ] {
            let err = SharedSheetUrl::parse(link).unwrap_err();
            assert!(matches!(err, EdaError::UnsupportedSource(_)), "{link}");
        }
    }
}
