//! Shared utilities for loading and reporting.
//!
//! This module contains common helper functions used across multiple modules
//! to keep missing-value and number handling consistent.

// =============================================================================
// Missing Value Utilities
// =============================================================================

/// Tokens treated as a missing cell, matching the defaults of common dataframe
/// CSV readers. Comparison is exact (case-sensitive) after trimming.
pub const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw cell value denotes a missing value.
///
/// # Example
///
/// ```rust,ignore
/// use eda_report::utils::is_missing_marker;
///
/// assert!(is_missing_marker(""));
/// assert!(is_missing_marker(" NA "));
/// assert!(!is_missing_marker("na"));
/// ```
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    NA_MARKERS.contains(&trimmed)
}

/// Normalize a raw cell into `None` (missing) or the original text.
pub fn normalize_cell(raw: &str) -> Option<String> {
    if is_missing_marker(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

// =============================================================================
// Number Utilities
// =============================================================================

/// Try to parse a cell as a finite or infinite float.
///
/// Surrounding whitespace is ignored; thousands separators and currency
/// symbols are not, so "1,234" stays text.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Format a number for tables and captions.
///
/// Integral values print without a fractional part, everything else with up to
/// six decimals and trailing zeros removed.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{:.0}", value);
    }

    let formatted = format!("{:.6}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format an optional statistic, using an empty string when it is absent.
pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

// =============================================================================
// String Utilities
// =============================================================================

/// Truncate a string to `max_chars` characters with a trailing ellipsis.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }
    let mut out: String = s.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}
