//! Shared data types passed between the loader, profiler, chart renderer and
//! report assembler.

use crate::error::{EdaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ============================================================================
// Input Types
// ============================================================================

/// Character encodings recognized for delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Strict UTF-8 without a byte-order mark.
    Utf8,
    /// UTF-8 with an optional leading byte-order mark.
    Utf8Sig,
    /// Latin-1 (bytes map 1:1 onto U+0000..U+00FF).
    Latin1,
    /// ISO-8859-1, the same mapping as Latin-1 under its registered name.
    Iso8859_1,
    /// Windows-1252 (WHATWG mapping).
    Windows1252,
}

impl TextEncoding {
    /// The preference order used when no configuration overrides it.
    pub const DEFAULT_ORDER: [TextEncoding; 5] = [
        TextEncoding::Utf8,
        TextEncoding::Utf8Sig,
        TextEncoding::Latin1,
        TextEncoding::Iso8859_1,
        TextEncoding::Windows1252,
    ];

    /// Label shown to users when reporting which encoding succeeded.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Sig => "utf-8-sig",
            Self::Latin1 => "latin1",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::Windows1252 => "cp1252",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declared or inferred media kind of an uploaded byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// CSV or another delimited text format.
    Delimited,
    /// Excel workbook (xlsx or legacy xls).
    Spreadsheet,
    /// PDF document containing a table.
    Pdf,
}

impl MediaKind {
    /// Infer the kind from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" | "txt" | "tsv" => Some(Self::Delimited),
            "xlsx" | "xlsm" | "xls" => Some(Self::Spreadsheet),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Recognize kinds that can be identified from the leading bytes alone.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// The MIME type associated with this kind.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Delimited => "text/csv",
            Self::Spreadsheet => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Opaque uploaded bytes plus their media kind.
#[derive(Debug, Clone)]
pub struct RawInput {
    bytes: Vec<u8>,
    kind: MediaKind,
    name: Option<String>,
}

impl RawInput {
    /// Wrap bytes with an explicitly declared kind.
    pub fn new(bytes: Vec<u8>, kind: MediaKind) -> Self {
        Self {
            bytes,
            kind,
            name: None,
        }
    }

    /// Read a file, inferring its kind from the extension and leading bytes.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let kind = MediaKind::sniff(&bytes)
            .or_else(|| MediaKind::from_extension(extension))
            .ok_or_else(|| {
                EdaError::UnsupportedSource(format!(
                    "unrecognized file type '{}' (expected csv, xlsx, xls or pdf)",
                    path.display()
                ))
            })?;

        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Ok(Self { bytes, kind, name })
    }

    /// Attach a display name (usually the uploaded file name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Everything the loader accepts.
#[derive(Debug, Clone)]
pub enum Source {
    /// Uploaded bytes.
    Raw(RawInput),
    /// A shared spreadsheet link.
    Url(String),
}

impl From<RawInput> for Source {
    fn from(input: RawInput) -> Self {
        Source::Raw(input)
    }
}

// ============================================================================
// Table Types
// ============================================================================

/// Semantic type of a column, fixed when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every present value parses as a number.
    Numeric,
    /// No present value parses as a number.
    Categorical,
    /// A mixture of numeric and non-numeric values.
    Mixed,
}

impl ColumnKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Mixed => "mixed",
        }
    }

    /// Whether bar and pie charts accept this kind.
    pub fn is_categorical_like(&self) -> bool {
        matches!(self, Self::Categorical | Self::Mixed)
    }
}

// ============================================================================
// Chart Types
// ============================================================================

/// The four chart kinds the renderer supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    Bar,
    Pie,
    Scatter,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Histogram => "Histogram",
            Self::Bar => "Bar Chart",
            Self::Pie => "Pie Chart",
            Self::Scatter => "Scatter Plot",
        }
    }
}

/// A request for one renderable chart.
///
/// Histogram, bar and pie take one column; scatter takes an (x, y) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Histogram { column: String },
    Bar { column: String },
    Pie { column: String },
    Scatter { x: String, y: String },
}

impl ChartSpec {
    pub fn histogram(column: impl Into<String>) -> Self {
        Self::Histogram {
            column: column.into(),
        }
    }

    pub fn bar(column: impl Into<String>) -> Self {
        Self::Bar {
            column: column.into(),
        }
    }

    pub fn pie(column: impl Into<String>) -> Self {
        Self::Pie {
            column: column.into(),
        }
    }

    pub fn scatter(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self::Scatter {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Histogram { .. } => ChartKind::Histogram,
            Self::Bar { .. } => ChartKind::Bar,
            Self::Pie { .. } => ChartKind::Pie,
            Self::Scatter { .. } => ChartKind::Scatter,
        }
    }

    /// Columns referenced by this request, in (x, y) order for scatter.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Histogram { column } | Self::Bar { column } | Self::Pie { column } => {
                vec![column.as_str()]
            }
            Self::Scatter { x, y } => vec![x.as_str(), y.as_str()],
        }
    }
}

impl fmt::Display for ChartSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scatter { x, y } => write!(f, "{} of {} vs {}", self.kind().label(), x, y),
            Self::Histogram { column } | Self::Bar { column } | Self::Pie { column } => {
                write!(f, "{} of {}", self.kind().label(), column)
            }
        }
    }
}

// ============================================================================
// Output Types
// ============================================================================

/// A rendered chart as PNG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageBytes {
    pub const MIME_TYPE: &'static str = "image/png";

    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The serialized report, ready for a download collaborator.
#[derive(Debug, Clone)]
pub struct DocumentBytes {
    bytes: Vec<u8>,
    file_name: String,
}

impl DocumentBytes {
    pub const MIME_TYPE: &'static str = "application/pdf";
    pub const DEFAULT_FILE_NAME: &'static str = "EDA_Report.pdf";

    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: Self::DEFAULT_FILE_NAME.to_string(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        Self::MIME_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Physical page size of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// US Letter, 8.5 x 11 in.
    #[default]
    Letter,
    /// ISO A4, 210 x 297 mm.
    A4,
}

impl PageSize {
    /// Width and height in PDF points (1/72 in).
    pub fn dimensions_pt(&self) -> (i64, i64) {
        match self {
            Self::Letter => (612, 792),
            Self::A4 => (595, 842),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_default_order() {
        let labels: Vec<_> = TextEncoding::DEFAULT_ORDER
            .iter()
            .map(|e| e.label())
            .collect();
        assert_eq!(
            labels,
            vec!["utf-8", "utf-8-sig", "latin1", "ISO-8859-1", "cp1252"]
        );
    }

    #[test]
    fn test_media_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("CSV"), Some(MediaKind::Delimited));
        assert_eq!(MediaKind::from_extension("xls"), Some(MediaKind::Spreadsheet));
        assert_eq!(MediaKind::from_extension("pdf"), Some(MediaKind::Pdf));
        assert_eq!(MediaKind::from_extension("docx"), None);
    }

    #[test]
    fn test_media_kind_sniff_pdf() {
        assert_eq!(MediaKind::sniff(b"%PDF-1.7\n..."), Some(MediaKind::Pdf));
        assert_eq!(MediaKind::sniff(b"a,b\n1,2\n"), None);
    }

    #[test]
    fn test_chart_spec_columns() {
        assert_eq!(ChartSpec::histogram("age").columns(), vec!["age"]);
        assert_eq!(ChartSpec::scatter("x", "y").columns(), vec!["x", "y"]);
        assert_eq!(ChartSpec::pie("region").kind(), ChartKind::Pie);
    }

    #[test]
    fn test_chart_spec_display() {
        assert_eq!(ChartSpec::bar("city").to_string(), "Bar Chart of city");
        assert_eq!(
            ChartSpec::scatter("h", "w").to_string(),
            "Scatter Plot of h vs w"
        );
    }

    #[test]
    fn test_page_size_dimensions() {
        assert_eq!(PageSize::Letter.dimensions_pt(), (612, 792));
        assert_eq!(PageSize::A4.dimensions_pt(), (595, 842));
    }

    #[test]
    fn test_raw_input_unknown_extension() {
        let dir = std::env::temp_dir().join("eda_report_types_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("notes.docx");
        std::fs::write(&path, b"not a table").unwrap();

        let err = RawInput::from_path(&path).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_SOURCE");
    }
}
