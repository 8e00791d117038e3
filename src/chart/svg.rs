use super::{ChartMeta, ChartRenderer};
use crate::core::{PortfolioPoint, PortfolioSeries};
use anyhow::{Context, Result};
use rust_decimal::prelude::ToPrimitive;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 120.0;
const Y_TICKS: usize = 5;
const MAX_X_TICKS: usize = 12;
const LINE_COLOR: &str = "#348dc1";
const AXIS_COLOR: &str = "#444444";
const GRID_COLOR: &str = "#e0e0e0";

/// Writes the chart as an SVG document.
pub struct SvgChartRenderer {
    path: PathBuf,
}

impl SvgChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, series: &PortfolioSeries, meta: &ChartMeta) -> Result<()> {
        let svg = to_svg(series, meta);
        std::fs::write(&self.path, svg)
            .with_context(|| format!("Failed to write chart to {}", self.path.display()))?;
        info!("Wrote chart to {}", self.path.display());
        Ok(())
    }
}

struct Scale {
    min: f64,
    max: f64,
    first_day: i64,
    span_days: i64,
}

impl Scale {
    fn new(points: &[PortfolioPoint]) -> Self {
        let values = points.iter().map(|p| to_f64(p.value));
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            let pad = (max.abs() * 0.1).max(1.0);
            (min - pad, max + pad)
        } else {
            (min, max)
        };

        let first_day = points.first().map_or(0, day_number);
        let last_day = points.last().map_or(0, day_number);
        Self {
            min,
            max,
            first_day,
            span_days: last_day - first_day,
        }
    }

    fn x(&self, point: &PortfolioPoint) -> f64 {
        let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        if self.span_days == 0 {
            return MARGIN_LEFT + plot_width / 2.0;
        }
        let offset = (day_number(point) - self.first_day) as f64;
        MARGIN_LEFT + offset / self.span_days as f64 * plot_width
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        HEIGHT - MARGIN_BOTTOM - (value - self.min) / (self.max - self.min) * plot_height
    }
}

fn to_f64(value: rust_decimal::Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn day_number(point: &PortfolioPoint) -> i64 {
    point.date.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp() / 86_400)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders `series` as a line chart, time on the x axis and value on the y axis.
pub fn to_svg(series: &PortfolioSeries, meta: &ChartMeta) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="28" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        escape_xml(&meta.title)
    );

    let points = series.points();
    if points.is_empty() {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">No data available.</text>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    let scale = Scale::new(points);
    let bottom = HEIGHT - MARGIN_BOTTOM;
    let right = WIDTH - MARGIN_RIGHT;

    // Horizontal grid and y tick labels
    for i in 0..=Y_TICKS {
        let value = scale.min + (scale.max - scale.min) * i as f64 / Y_TICKS as f64;
        let y = scale.y(value);
        let _ = writeln!(
            svg,
            r#"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{right}" y2="{y:.1}" stroke="{GRID_COLOR}"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{value:.2}</text>"#,
            MARGIN_LEFT - 8.0,
            y + 4.0
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{bottom}" stroke="{AXIS_COLOR}"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="{AXIS_COLOR}"/>"#
    );

    // Date ticks, rotated so they don't overlap
    let step = points.len().div_ceil(MAX_X_TICKS).max(1);
    for point in points.iter().step_by(step) {
        let x = scale.x(point);
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.1}" y1="{bottom}" x2="{x:.1}" y2="{:.1}" stroke="{AXIS_COLOR}"/>"#,
            bottom + 5.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="end" transform="rotate(-90 {x:.1} {:.1})">{}</text>"#,
            bottom + 10.0,
            bottom + 10.0,
            point.date.format("%Y-%m-%d")
        );
    }

    // Axis labels
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        MARGIN_LEFT + (right - MARGIN_LEFT) / 2.0,
        HEIGHT - 12.0,
        escape_xml(&meta.x_label)
    );
    let _ = writeln!(
        svg,
        r#"<text x="18" y="{0:.1}" text-anchor="middle" transform="rotate(-90 18 {0:.1})">{1}</text>"#,
        MARGIN_TOP + (bottom - MARGIN_TOP) / 2.0,
        escape_xml(&meta.y_label)
    );

    // Series
    let polyline: Vec<String> = points
        .iter()
        .map(|p| format!("{:.1},{:.1}", scale.x(p), scale.y(to_f64(p.value))))
        .collect();
    let _ = writeln!(
        svg,
        r#"<polyline fill="none" stroke="{LINE_COLOR}" stroke-width="1.5" points="{}"/>"#,
        polyline.join(" ")
    );

    // Legend
    let legend_x = right - 120.0;
    let legend_y = MARGIN_TOP + 16.0;
    let _ = writeln!(
        svg,
        r#"<line x1="{legend_x}" y1="{legend_y}" x2="{}" y2="{legend_y}" stroke="{LINE_COLOR}" stroke-width="2"/>"#,
        legend_x + 24.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}">{}</text>"#,
        legend_x + 30.0,
        legend_y + 4.0,
        escape_xml(&meta.series_label)
    );

    svg.push_str("</svg>\n");
    svg
}
