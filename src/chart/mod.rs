//! Chart rendering of portfolio histories.

pub mod svg;

use crate::core::PortfolioSeries;
use anyhow::Result;

pub use svg::SvgChartRenderer;

/// Labels drawn around a chart.
#[derive(Debug, Clone)]
pub struct ChartMeta {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series_label: String,
}

pub trait ChartRenderer {
    fn render(&self, series: &PortfolioSeries, meta: &ChartMeta) -> Result<()>;
}
