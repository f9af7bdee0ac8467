//! Configuration types for the EDA report pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::types::{PageSize, TextEncoding};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for loading, charting and report assembly.
///
/// Use [`EdaConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use eda_report::config::EdaConfig;
///
/// let config = EdaConfig::builder()
///     .fetch_timeout_secs(10)
///     .duplicate_sample_limit(50)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaConfig {
    /// Text encodings tried, in order, for delimited input.
    /// Default: UTF-8, UTF-8 with signature, Latin-1, ISO-8859-1, Windows-1252
    pub encodings: Vec<TextEncoding>,

    /// Field delimiter for delimited text.
    /// Default: b','
    pub delimiter: u8,

    /// Timeout for fetching shared spreadsheets, in seconds.
    /// Default: 30
    pub fetch_timeout_secs: u64,

    /// Maximum number of duplicate rows kept in the profile sample.
    /// Default: 20
    pub duplicate_sample_limit: usize,

    /// Chart raster width in pixels.
    /// Default: 640
    pub chart_width: u32,

    /// Chart raster height in pixels.
    /// Default: 480
    pub chart_height: u32,

    /// Whether histograms carry a smoothed density overlay.
    /// Default: true
    pub show_density: bool,

    /// Number of leading categories listed in bar/pie captions.
    /// Default: 5
    pub top_categories_in_caption: usize,

    /// Title printed at the top of the report.
    /// Default: "EDA Report"
    pub report_title: String,

    /// Page size of the report document.
    /// Default: Letter
    pub page_size: PageSize,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            encodings: TextEncoding::DEFAULT_ORDER.to_vec(),
            delimiter: b',',
            fetch_timeout_secs: 30,
            duplicate_sample_limit: 20,
            chart_width: 640,
            chart_height: 480,
            show_density: true,
            top_categories_in_caption: 5,
            report_title: "EDA Report".to_string(),
            page_size: PageSize::default(),
        }
    }
}

impl EdaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EdaConfigBuilder {
        EdaConfigBuilder::default()
    }

    /// Timeout for the remote fetch as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.encodings.is_empty() {
            return Err(ConfigValidationError::NoEncodings);
        }

        if self.fetch_timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'\n' | b'\r' | b'"') {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        for (field, value) in [
            ("chart_width", self.chart_width),
            ("chart_height", self.chart_height),
        ] {
            if !(100..=4000).contains(&value) {
                return Err(ConfigValidationError::InvalidChartSize {
                    field: field.to_string(),
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("At least one text encoding must be configured")]
    NoEncodings,

    #[error("Fetch timeout must be at least 1 second")]
    InvalidTimeout,

    #[error("Invalid delimiter byte: {0:#04x}")]
    InvalidDelimiter(u8),

    #[error("Invalid chart size for '{field}': {value} (must be between 100 and 4000 pixels)")]
    InvalidChartSize { field: String, value: u32 },
}

/// Builder for [`EdaConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EdaConfigBuilder {
    encodings: Option<Vec<TextEncoding>>,
    delimiter: Option<u8>,
    fetch_timeout_secs: Option<u64>,
    duplicate_sample_limit: Option<usize>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    show_density: Option<bool>,
    top_categories_in_caption: Option<usize>,
    report_title: Option<String>,
    page_size: Option<PageSize>,
}

impl EdaConfigBuilder {
    /// Start from an existing configuration, e.g. one read from a JSON file.
    pub fn from_config(config: EdaConfig) -> Self {
        Self {
            encodings: Some(config.encodings),
            delimiter: Some(config.delimiter),
            fetch_timeout_secs: Some(config.fetch_timeout_secs),
            duplicate_sample_limit: Some(config.duplicate_sample_limit),
            chart_width: Some(config.chart_width),
            chart_height: Some(config.chart_height),
            show_density: Some(config.show_density),
            top_categories_in_caption: Some(config.top_categories_in_caption),
            report_title: Some(config.report_title),
            page_size: Some(config.page_size),
        }
    }

    /// Set the ordered list of text encodings to try.
    pub fn encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = Some(encodings);
        self
    }

    /// Set the field delimiter for delimited text.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the remote fetch timeout in seconds.
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = Some(secs);
        self
    }

    /// Set how many duplicate rows are kept in the profile sample.
    pub fn duplicate_sample_limit(mut self, limit: usize) -> Self {
        self.duplicate_sample_limit = Some(limit);
        self
    }

    /// Set the chart raster size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = Some(width);
        self.chart_height = Some(height);
        self
    }

    /// Enable or disable the density overlay on histograms.
    pub fn show_density(mut self, show: bool) -> Self {
        self.show_density = Some(show);
        self
    }

    /// Set how many categories bar/pie captions list.
    pub fn top_categories_in_caption(mut self, count: usize) -> Self {
        self.top_categories_in_caption = Some(count);
        self
    }

    /// Set the report title.
    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = Some(title.into());
        self
    }

    /// Set the report page size.
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `EdaConfig` or an error if validation fails.
    pub fn build(self) -> Result<EdaConfig, ConfigValidationError> {
        let defaults = EdaConfig::default();
        let config = EdaConfig {
            encodings: self.encodings.unwrap_or(defaults.encodings),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            fetch_timeout_secs: self.fetch_timeout_secs.unwrap_or(defaults.fetch_timeout_secs),
            duplicate_sample_limit: self
                .duplicate_sample_limit
                .unwrap_or(defaults.duplicate_sample_limit),
            chart_width: self.chart_width.unwrap_or(defaults.chart_width),
            chart_height: self.chart_height.unwrap_or(defaults.chart_height),
            show_density: self.show_density.unwrap_or(defaults.show_density),
            top_categories_in_caption: self
                .top_categories_in_caption
                .unwrap_or(defaults.top_categories_in_caption),
            report_title: self.report_title.unwrap_or(defaults.report_title),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EdaConfig::default();
        assert_eq!(config.encodings, TextEncoding::DEFAULT_ORDER.to_vec());
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.duplicate_sample_limit, 20);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.page_size, PageSize::Letter);
        assert!(config.show_density);
    }

    #[test]
    fn test_builder_defaults() {
        let config = EdaConfig::builder().build().unwrap();
        assert_eq!(config.chart_width, 640);
        assert_eq!(config.chart_height, 480);
        assert_eq!(config.report_title, "EDA Report");
    }

    #[test]
    fn test_builder_custom_values() {
        let config = EdaConfig::builder()
            .delimiter(b';')
            .fetch_timeout_secs(5)
            .duplicate_sample_limit(3)
            .chart_size(800, 600)
            .page_size(PageSize::A4)
            .report_title("Sales EDA")
            .build()
            .unwrap();

        assert_eq!(config.delimiter, b';');
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.duplicate_sample_limit, 3);
        assert_eq!((config.chart_width, config.chart_height), (800, 600));
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.report_title, "Sales EDA");
    }

    #[test]
    fn test_validation_empty_encodings() {
        let result = EdaConfig::builder().encodings(Vec::new()).build();
        assert!(matches!(result, Err(ConfigValidationError::NoEncodings)));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let result = EdaConfig::builder().fetch_timeout_secs(0).build();
        assert!(matches!(result, Err(ConfigValidationError::InvalidTimeout)));
    }

    #[test]
    fn test_validation_quote_delimiter() {
        let result = EdaConfig::builder().delimiter(b'"').build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::InvalidDelimiter(b'"'))
        ));
    }

    #[test]
    fn test_validation_chart_size() {
        let result = EdaConfig::builder().chart_size(10, 480).build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::InvalidChartSize { .. })
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "encodings": ["Utf8", "Windows1252"],
            "delimiter": 59,
            "fetch_timeout_secs": 12,
            "duplicate_sample_limit": 5,
            "chart_width": 320,
            "chart_height": 240,
            "show_density": false,
            "top_categories_in_caption": 3,
            "report_title": "Quarterly",
            "page_size": "A4"
        }"#;

        let config: EdaConfig = serde_json::from_str(json).expect("Should deserialize");
        let config = EdaConfigBuilder::from_config(config).build().unwrap();

        assert_eq!(
            config.encodings,
            vec![TextEncoding::Utf8, TextEncoding::Windows1252]
        );
        assert_eq!(config.delimiter, b';');
        assert!(!config.show_density);
        assert_eq!(config.page_size, PageSize::A4);
    }
}
