//! Integration tests for the EDA report pipeline.
//!
//! These tests verify end-to-end behavior from raw bytes to the PDF report.

use eda_report::{
    ChartPlan, ChartSpec, ColumnKind, ColumnStats, EdaConfig, EdaError, Interpretation,
    MediaKind, Pipeline, ProfileAnalyzer, RawInput, ReportAssembler, ReportStage, Source,
    SourceLoader, TextEncoding,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn csv_source(bytes: &[u8]) -> Source {
    Source::from(RawInput::new(bytes.to_vec(), MediaKind::Delimited))
}

fn small_config() -> EdaConfig {
    EdaConfig::builder()
        .chart_size(240, 180)
        .build()
        .expect("valid config")
}

// ============================================================================
// Loading Tests
// ============================================================================

#[test]
fn test_simple_csv_scenario() {
    let load = SourceLoader::default()
        .load(&csv_source(b"a,b\n1,x\n2,y\n1,x\n"))
        .unwrap();
    let profile = ProfileAnalyzer::default().analyze(&load.table);

    assert_eq!(profile.column_names, vec!["a", "b"]);
    assert_eq!(profile.row_count, 3);
    assert_eq!(profile.duplicate_row_count, 1);
    assert_eq!(profile.missing_count("a"), Some(0));
    assert_eq!(profile.missing_count("b"), Some(0));
    assert_eq!(load.describe(), "File loaded successfully as CSV using utf-8 encoding");
}

#[test]
fn test_malformed_rows_are_dropped() {
    let mut text = String::from("id,label\n");
    for i in 0..100 {
        text.push_str(&format!("{i},row{i}\n"));
        if i % 40 == 0 {
            text.push_str("1,2,3\n");
        }
    }

    let load = SourceLoader::default().load(&csv_source(text.as_bytes())).unwrap();
    assert_eq!(load.table.row_count(), 100);
    assert_eq!(load.skipped_rows, 3);
}

#[test]
fn test_utf8_preferred_over_latin1() {
    let load = SourceLoader::default()
        .load(&csv_source("city\nBogotá\n".as_bytes()))
        .unwrap();
    assert_eq!(
        load.interpretation,
        Interpretation::Delimited {
            encoding: TextEncoding::Utf8
        }
    );
    assert_eq!(
        load.table.text_values("city").unwrap(),
        vec![Some("Bogotá".to_string())]
    );
}

#[test]
fn test_latin1_bytes_fall_back() {
    let load = SourceLoader::default()
        .load(&csv_source(b"city\nBogot\xe1\n"))
        .unwrap();
    assert_eq!(
        load.interpretation,
        Interpretation::Delimited {
            encoding: TextEncoding::Latin1
        }
    );
    assert_eq!(
        load.table.text_values("city").unwrap(),
        vec![Some("Bogotá".to_string())]
    );
}

#[test]
fn test_non_sheet_url_rejected_without_fetch() {
    let err = SourceLoader::default()
        .load(&Source::Url("https://example.com/sheet.csv".to_string()))
        .unwrap_err();
    assert!(matches!(err, EdaError::UnsupportedSource(_)));
    assert_eq!(err.error_code(), "UNSUPPORTED_SOURCE");
}

#[test]
fn test_fixture_file_loads_with_kinds() {
    let input = RawInput::from_path(fixtures_path().join("employees.csv")).unwrap();
    assert_eq!(input.kind(), MediaKind::Delimited);

    let load = SourceLoader::default().load(&Source::from(input)).unwrap();
    assert_eq!(load.table.shape(), (8, 5));
    assert_eq!(
        load.table.columns(),
        vec![
            ("name".to_string(), ColumnKind::Categorical),
            ("age".to_string(), ColumnKind::Numeric),
            ("department".to_string(), ColumnKind::Categorical),
            ("salary".to_string(), ColumnKind::Numeric),
            ("city".to_string(), ColumnKind::Categorical),
        ]
    );
}

#[test]
fn test_workbook_falls_back_to_spreadsheet() {
    let input = RawInput::from_path(fixtures_path().join("staff.xlsx")).unwrap();
    assert_eq!(input.kind(), MediaKind::Spreadsheet);

    let load = SourceLoader::default().load(&Source::from(input)).unwrap();
    assert_eq!(
        load.interpretation,
        Interpretation::Spreadsheet {
            sheet: "Staff".to_string()
        }
    );
    assert_eq!(load.table.shape(), (3, 3));
    assert_eq!(
        load.table.columns(),
        vec![
            ("name".to_string(), ColumnKind::Categorical),
            ("age".to_string(), ColumnKind::Numeric),
            ("city".to_string(), ColumnKind::Categorical),
        ]
    );

    let profile = ProfileAnalyzer::default().analyze(&load.table);
    assert_eq!(profile.missing_count("city"), Some(1));
}

// ============================================================================
// Profiling Tests
// ============================================================================

#[test]
fn test_row_count_matches_column_length() {
    let inputs: [&[u8]; 3] = [b"a,b\n1,2\n3,4\n", b"a\n\n", b"x,y,z\n,,\n1,,\n"];
    for text in inputs {
        let table = SourceLoader::default().load(&csv_source(text)).unwrap().table;
        let profile = ProfileAnalyzer::default().analyze(&table);
        let first = &table.column_names()[0];
        assert_eq!(profile.row_count, table.display_values(first).unwrap().len());
    }

    let empty = ProfileAnalyzer::default().analyze(&eda_report::Table::empty());
    assert_eq!(empty.row_count, 0);
}

#[test]
fn test_duplicate_detection_is_idempotent() {
    let input = RawInput::from_path(fixtures_path().join("employees.csv")).unwrap();
    let table = SourceLoader::default().load(&Source::from(input)).unwrap().table;

    let analyzer = ProfileAnalyzer::default();
    let first = analyzer.analyze(&table);
    let second = analyzer.analyze(&table);

    assert_eq!(first.duplicate_row_count, 1);
    assert_eq!(first.duplicate_row_count, second.duplicate_row_count);
    assert_eq!(first.duplicate_rows, second.duplicate_rows);
    assert_eq!(first.duplicate_rows.rows[0].index, 5);
}

#[test]
fn test_fixture_statistics() {
    let input = RawInput::from_path(fixtures_path().join("employees.csv")).unwrap();
    let table = SourceLoader::default().load(&Source::from(input)).unwrap().table;
    let profile = ProfileAnalyzer::default().analyze(&table);

    assert_eq!(profile.missing_count("age"), Some(1));
    assert_eq!(profile.missing_count("department"), Some(1));
    assert_eq!(profile.missing_count("salary"), Some(1));

    match profile.column_statistics("department") {
        Some(ColumnStats::Categorical { count, top, freq, .. }) => {
            assert_eq!(*count, 7);
            assert_eq!(top.as_deref(), Some("Engineering"));
            assert_eq!(*freq, 4);
        }
        other => panic!("unexpected stats: {other:?}"),
    }
    match profile.column_statistics("age") {
        Some(ColumnStats::Numeric { count, min, max, .. }) => {
            assert_eq!(*count, 7);
            assert_eq!(*min, Some(29.0));
            assert_eq!(*max, Some(52.0));
        }
        other => panic!("unexpected stats: {other:?}"),
    }
}

// ============================================================================
// Chart Tests
// ============================================================================

#[test]
fn test_histogram_of_all_null_column_rejected() {
    let table = SourceLoader::default()
        .load(&csv_source(b"a,b\n1,\n2,\n"))
        .unwrap()
        .table;
    let err = eda_report::ChartRenderer::from_config(&small_config())
        .render(&table, &ChartSpec::histogram("b"))
        .unwrap_err();
    assert!(matches!(err, EdaError::InvalidChartRequest(_)));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_zero_charts_still_produce_document() {
    let table = SourceLoader::default()
        .load(&csv_source(b"a,b\n1,x\n2,y\n"))
        .unwrap()
        .table;
    let profile = ProfileAnalyzer::default().analyze(&table);
    let document = ReportAssembler::default()
        .assemble(&profile, &[], &table)
        .unwrap();

    assert!(!document.is_empty());
    assert!(document.as_bytes().starts_with(b"%PDF"));
    assert_eq!(document.mime_type(), "application/pdf");

    let parsed = lopdf::Document::load_mem(document.as_bytes()).expect("valid PDF");
    assert!(!parsed.get_pages().is_empty());
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_with_default_charts() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = stages.clone();

    let input = RawInput::from_path(fixtures_path().join("employees.csv")).unwrap();
    let output = Pipeline::builder()
        .config(small_config())
        .on_progress(move |update| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(&Source::from(input))
        .unwrap();

    let specs: Vec<ChartSpec> = output.charts.iter().map(|c| c.spec.clone()).collect();
    assert_eq!(
        specs,
        vec![
            ChartSpec::histogram("age"),
            ChartSpec::bar("name"),
            ChartSpec::pie("name"),
            ChartSpec::scatter("age", "age"),
        ]
    );
    assert!(output.failed_charts.is_empty());
    for chart in &output.charts {
        assert!(chart.image.as_bytes().starts_with(b"\x89PNG"));
        assert!(chart.caption.starts_with(&chart.spec.to_string()));
    }

    let parsed = lopdf::Document::load_mem(output.document.as_bytes()).expect("valid PDF");
    assert!(!parsed.get_pages().is_empty());

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&ReportStage::Loading));
    assert_eq!(stages.last(), Some(&ReportStage::Complete));
}

#[test]
fn test_pipeline_selected_charts_with_failures() {
    let output = Pipeline::builder()
        .config(small_config())
        .chart_plan(ChartPlan::Selected(vec![
            ChartSpec::pie("city"),
            ChartSpec::scatter("age", "city"),
        ]))
        .build()
        .unwrap()
        .run(&csv_source(b"age,city\n30,Lima\n40,Quito\n"))
        .unwrap();

    assert_eq!(output.charts.len(), 1);
    assert_eq!(output.failed_charts.len(), 1);
    assert_eq!(output.failed_charts[0].spec, ChartSpec::scatter("age", "city"));
    assert!(output.document.as_bytes().starts_with(b"%PDF"));
}

#[test]
fn test_pipeline_aborts_on_ingestion_failure() {
    let err = Pipeline::builder()
        .chart_plan(ChartPlan::Skip)
        .build()
        .unwrap()
        .run(&csv_source(b"\x00\x01\x02"))
        .unwrap_err();

    assert!(err.is_ingestion());
    match err {
        EdaError::AllEncodingsFailed { attempts } => assert_eq!(attempts.len(), 6),
        other => panic!("unexpected error: {other}"),
    }
}
