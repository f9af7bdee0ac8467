//! Custom error types for the EDA report pipeline.
//!
//! This module provides the error taxonomy using `thiserror`. Every variant maps
//! to a stable error code and a short, user-facing message so a display layer can
//! classify failures without parsing the internal detail.
//!
//! Errors are serializable, allowing them to be sent to a frontend or printed as
//! JSON by the CLI.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for ingestion, analysis, rendering and assembly.
#[derive(Error, Debug)]
pub enum EdaError {
    /// The input kind or URL pattern is not recognized.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// Every text encoding (and the spreadsheet fallback) failed.
    #[error("Could not read input as delimited text or spreadsheet (tried: {})", attempts.join(", "))]
    AllEncodingsFailed { attempts: Vec<String> },

    /// The PDF contains no detectable table.
    #[error("No table found in PDF: {0}")]
    NoTableFound(String),

    /// PDF table extraction is not compiled into this build.
    #[error("PDF table extraction is not available in this build")]
    ExtractionUnavailable,

    /// Network or transport failure while fetching a shared spreadsheet.
    #[error("Failed to fetch remote spreadsheet: {0}")]
    RemoteFetchFailed(String),

    /// Summary statistics could not be computed.
    #[error("Statistics unavailable: {0}")]
    AnalysisUnavailable(String),

    /// A chart was requested for a missing column or a column of the wrong type.
    #[error("Invalid chart request: {0}")]
    InvalidChartRequest(String),

    /// The raster backend failed while drawing a chart.
    #[error("Failed to render chart: {0}")]
    RenderFailed(String),

    /// The report document could not be built or serialized.
    #[error("Failed to assemble report: {0}")]
    AssemblyFailed(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedSource(_) => "UNSUPPORTED_SOURCE",
            Self::AllEncodingsFailed { .. } => "ALL_ENCODINGS_FAILED",
            Self::NoTableFound(_) => "NO_TABLE_FOUND",
            Self::ExtractionUnavailable => "EXTRACTION_UNAVAILABLE",
            Self::RemoteFetchFailed(_) => "REMOTE_FETCH_FAILED",
            Self::AnalysisUnavailable(_) => "ANALYSIS_UNAVAILABLE",
            Self::InvalidChartRequest(_) => "INVALID_CHART_REQUEST",
            Self::RenderFailed(_) => "RENDER_FAILED",
            Self::AssemblyFailed(_) => "ASSEMBLY_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Short, human-readable message for display surfaces.
    ///
    /// Unlike `Display`, this never includes the internal fault detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnsupportedSource(_) => "This file type or link is not supported",
            Self::AllEncodingsFailed { .. } => {
                "The file could not be read as CSV or Excel with any supported encoding"
            }
            Self::NoTableFound(_) => "No tables found in PDF",
            Self::ExtractionUnavailable => "PDF table extraction is not installed",
            Self::RemoteFetchFailed(_) => "Failed to load the shared spreadsheet",
            Self::AnalysisUnavailable(_) => "Could not generate statistics for this dataset",
            Self::InvalidChartRequest(_) => "The selected column cannot be used for this chart",
            Self::RenderFailed(_) => "The chart could not be drawn",
            Self::AssemblyFailed(_) => "The PDF report could not be generated",
            Self::InvalidConfig(_) => "The configuration is invalid",
            Self::Io(_) | Self::Polars(_) | Self::Json(_) => "An internal error occurred",
            Self::WithContext { source, .. } => source.user_message(),
        }
    }

    /// Check if this error came from the ingestion stage.
    ///
    /// Ingestion failures abort the whole pipeline; no partial table exists.
    pub fn is_ingestion(&self) -> bool {
        match self {
            Self::UnsupportedSource(_)
            | Self::AllEncodingsFailed { .. }
            | Self::NoTableFound(_)
            | Self::ExtractionUnavailable
            | Self::RemoteFetchFailed(_) => true,
            Self::WithContext { source, .. } => source.is_ingestion(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields,
/// making them easy to handle in the frontend.
impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<crate::config::ConfigValidationError> for EdaError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        EdaError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for EDA operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}
