//! Pie chart of category proportions.

use super::bar::ValueCount;
use super::{CHART_FONT_FAMILY, render_error, PALETTE};
use crate::error::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::{FRAC_PI_2, PI};

/// Points per full turn used to approximate arcs.
const ARC_RESOLUTION: f64 = 360.0;
const LABEL_SIZE: u32 = 14;

/// Angular extent of each wedge, starting at twelve o'clock and running
/// counter-clockwise.
pub(crate) fn wedge_angles(counts: &[ValueCount]) -> Vec<(f64, f64)> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut start = FRAC_PI_2;
    counts
        .iter()
        .map(|c| {
            let sweep = 2.0 * PI * c.count as f64 / total as f64;
            let wedge = (start, start + sweep);
            start += sweep;
            wedge
        })
        .collect()
}

pub(crate) fn percentages(counts: &[ValueCount]) -> Vec<f64> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| 100.0 * c.count as f64 / total.max(1) as f64)
        .collect()
}

pub(crate) fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    counts: &[ValueCount],
) -> Result<()> {
    let (width, height) = root.dim_in_pixel();
    let body = root
        .titled(title, (CHART_FONT_FAMILY, 20))
        .map_err(render_error)?;

    // equal aspect: the pie lives in the largest centred square
    let side = width.min(height.saturating_sub(30)) as f64;
    let radius = side * 0.38;
    let center = (width as f64 / 2.0, (height as f64 - 30.0) / 2.0);
    let to_pixel = |angle: f64, r: f64| {
        (
            (center.0 + r * angle.cos()).round() as i32,
            (center.1 - r * angle.sin()).round() as i32,
        )
    };

    let shares = percentages(counts);
    for (i, (start, end)) in wedge_angles(counts).into_iter().enumerate() {
        let steps = (((end - start) / (2.0 * PI)) * ARC_RESOLUTION).ceil().max(1.0) as usize;
        let mut outline = Vec::with_capacity(steps + 2);
        outline.push(to_pixel(0.0, 0.0));
        for step in 0..=steps {
            let angle = start + (end - start) * step as f64 / steps as f64;
            outline.push(to_pixel(angle, radius));
        }

        let color = PALETTE[i % PALETTE.len()];
        body.draw(&Polygon::new(outline.clone(), color.filled()))
            .map_err(render_error)?;
        outline.push(to_pixel(0.0, 0.0));
        body.draw(&PathElement::new(outline, WHITE.stroke_width(1)))
            .map_err(render_error)?;

        let middle = (start + end) / 2.0;
        let label = format!("{} {:.1}%", counts[i].value, shares[i]);
        body.draw(&Text::new(
            label,
            to_pixel(middle, radius * 1.12),
            (CHART_FONT_FAMILY, LABEL_SIZE).into_font(),
        ))
        .map_err(render_error)?;
    }
    Ok(())
}

pub(crate) fn caption(counts: &[ValueCount], top: usize) -> String {
    let shares = percentages(counts);
    let listed: Vec<String> = counts
        .iter()
        .zip(&shares)
        .take(top)
        .map(|(c, share)| format!("{} {:.1}%", c.value, share))
        .collect();

    let mut text = format!("share of {} categories: {}", counts.len(), listed.join(", "));
    if counts.len() > top {
        let rest: f64 = shares.iter().skip(top).sum();
        text.push_str(&format!(", other {:.1}%", rest));
    }
    text.push('.');
    text
}
