//! Values a fixed set of holdings against an aligned price table.
//!
//! Arithmetic is done in `Decimal`, but results are meant for charting, not
//! for ledger-grade accounting.

use super::align::AlignedTable;
use super::error::HistoryError;
use super::holdings::Holding;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Total value of the holdings on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortfolioPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Portfolio value per timeline date, strictly ascending by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioSeries {
    points: Vec<PortfolioPoint>,
}

/// Headline numbers of a portfolio series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
    pub first: PortfolioPoint,
    pub last: PortfolioPoint,
    pub low: PortfolioPoint,
    pub high: PortfolioPoint,
    pub change: Decimal,
    /// Percentage change from first to last, `None` when the first value is zero.
    pub change_pct: Option<Decimal>,
}

impl PortfolioSeries {
    pub fn points(&self) -> &[PortfolioPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn summary(&self) -> Option<SeriesSummary> {
        let first = *self.points.first()?;
        let last = *self.points.last()?;
        let low = *self.points.iter().min_by_key(|p| p.value)?;
        let high = *self.points.iter().max_by_key(|p| p.value)?;

        let change = last.value - first.value;
        let change_pct = (!first.value.is_zero())
            .then(|| (change / first.value * Decimal::ONE_HUNDRED).round_dp(2));

        Some(SeriesSummary {
            first,
            last,
            low,
            high,
            change,
            change_pct,
        })
    }
}

/// Computes `Σ quantity × price` for every date of the table's timeline.
///
/// Assets missing from the table contribute nothing.
pub fn value_portfolio(
    holdings: &[Holding],
    table: &AlignedTable,
) -> Result<PortfolioSeries, HistoryError> {
    if holdings.is_empty() {
        return Err(HistoryError::NoHoldings);
    }

    let mut totals = vec![Decimal::ZERO; table.timeline().len()];
    for holding in holdings {
        let Some(column) = table.column(&holding.asset) else {
            continue;
        };
        for (total, price) in totals.iter_mut().zip(column) {
            *total += holding.quantity * *price;
        }
    }

    let points = table
        .timeline()
        .dates()
        .iter()
        .zip(totals)
        .map(|(date, value)| PortfolioPoint {
            date: *date,
            value: value.normalize(),
        })
        .collect();

    Ok(PortfolioSeries { points })
}
