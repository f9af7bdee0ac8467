//! The display seam.
//!
//! The library never prints. Whatever shows results to a person (a terminal,
//! a web page, a desktop window) implements [`DisplaySurface`] and is driven
//! by [`present`].

use crate::error::{EdaError, Result};
use crate::pipeline::PipelineOutput;
use crate::profiler::Profile;
use crate::table::TablePreview;
use crate::types::ImageBytes;

/// Something that can show previews, key/value facts, images and errors.
pub trait DisplaySurface {
    fn show_preview(&mut self, preview: &TablePreview);

    fn show_facts(&mut self, facts: &[(String, String)]);

    fn show_image(&mut self, caption: &str, image: &ImageBytes);

    fn show_error(&mut self, error: &EdaError);
}

/// Headline facts of a profile as label/value pairs.
pub fn profile_facts(profile: &Profile) -> Vec<(String, String)> {
    let mut facts = vec![
        (
            "Shape".to_string(),
            format!("({}, {})", profile.row_count, profile.column_count),
        ),
        ("Columns".to_string(), profile.column_names.join(", ")),
        (
            "Duplicate rows".to_string(),
            profile.duplicate_row_count.to_string(),
        ),
    ];

    let missing: Vec<String> = profile
        .missing_counts
        .iter()
        .filter(|m| m.missing > 0)
        .map(|m| format!("{} ({})", m.column, m.missing))
        .collect();
    facts.push((
        "Missing values".to_string(),
        if missing.is_empty() {
            "none".to_string()
        } else {
            missing.join(", ")
        },
    ));
    facts
}

/// Walk a finished run through a surface: load message, preview, facts,
/// charts, then any chart that failed.
pub fn present<S: DisplaySurface + ?Sized>(
    surface: &mut S,
    output: &PipelineOutput,
    preview_rows: usize,
) -> Result<()> {
    let mut facts = vec![("Status".to_string(), output.load.describe())];
    if output.load.skipped_rows > 0 {
        facts.push((
            "Skipped rows".to_string(),
            output.load.skipped_rows.to_string(),
        ));
    }
    surface.show_facts(&facts);

    if preview_rows > 0 {
        surface.show_preview(&output.load.table.preview(preview_rows)?);
    }
    surface.show_facts(&profile_facts(&output.profile));

    for chart in &output.charts {
        surface.show_image(&chart.caption, &chart.image);
    }
    for failure in &output.failed_charts {
        surface.show_error(&failure.error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartPlan;
    use crate::pipeline::{ChartFailure, Pipeline};
    use crate::types::{ChartSpec, MediaKind, RawInput, Source};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl DisplaySurface for Recorder {
        fn show_preview(&mut self, preview: &TablePreview) {
            self.events.push(format!("preview:{}", preview.rows.len()));
        }

        fn show_facts(&mut self, facts: &[(String, String)]) {
            for (label, value) in facts {
                self.events.push(format!("{label}={value}"));
            }
        }

        fn show_image(&mut self, caption: &str, _image: &ImageBytes) {
            self.events.push(format!("image:{caption}"));
        }

        fn show_error(&mut self, error: &EdaError) {
            self.events.push(format!("error:{}", error.error_code()));
        }
    }

    #[test]
    fn test_present_order() {
        let input = RawInput::new(b"a,b\n1,x\n2,\n1,x\n".to_vec(), MediaKind::Delimited);
        let output = Pipeline::builder()
            .chart_plan(ChartPlan::Selected(vec![ChartSpec::histogram("b")]))
            .build()
            .unwrap()
            .run(&Source::from(input))
            .unwrap();

        let mut recorder = Recorder::default();
        present(&mut recorder, &output, 2).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "Status=File loaded successfully as CSV using utf-8 encoding",
                "preview:2",
                "Shape=(3, 2)",
                "Columns=a, b",
                "Duplicate rows=1",
                "Missing values=b (1)",
                "error:INVALID_CHART_REQUEST",
            ]
        );
    }

    #[test]
    fn test_failures_keep_their_kind() {
        let input = RawInput::new(b"a\n1\n2\n".to_vec(), MediaKind::Delimited);
        let mut output = Pipeline::builder()
            .chart_plan(ChartPlan::Skip)
            .build()
            .unwrap()
            .run(&Source::from(input))
            .unwrap();
        output.failed_charts.push(ChartFailure {
            spec: ChartSpec::histogram("a"),
            error: EdaError::RenderFailed("backend gave up".to_string())
                .with_context("Histogram of a"),
        });

        let mut recorder = Recorder::default();
        present(&mut recorder, &output, 0).unwrap();

        assert_eq!(recorder.events.last().map(String::as_str), Some("error:RENDER_FAILED"));
        assert!(!recorder.events.iter().any(|e| e == "error:INVALID_CHART_REQUEST"));
    }
}
