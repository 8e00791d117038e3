//! Aligns per-asset price histories onto a shared timeline.
//!
//! Each asset is merge-joined against the timeline: at every date the
//! effective price is the latest known price on or before that date, and
//! zero before the asset's first price.

use super::asset::Asset;
use super::error::HistoryError;
use super::price::{DateWindow, PricePoint, RawSeries};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Sorted, distinct dates used as the x-axis of a history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    dates: Vec<NaiveDate>,
}

impl Timeline {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Union of all dates across `series` that fall within `window`.
    pub fn from_series<'a>(
        series: impl IntoIterator<Item = &'a RawSeries>,
        window: &DateWindow,
    ) -> Self {
        Self::new(
            series
                .into_iter()
                .flat_map(|s| s.points().iter().map(|p| p.date))
                .filter(|date| window.contains(*date)),
        )
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Effective price of every asset at every timeline date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedTable {
    timeline: Timeline,
    columns: BTreeMap<Asset, Vec<Decimal>>,
}

impl AlignedTable {
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.columns.keys()
    }

    /// Prices of `asset`, one per timeline date.
    pub fn column(&self, asset: &Asset) -> Option<&[Decimal]> {
        self.columns.get(asset).map(Vec::as_slice)
    }

    pub fn price(&self, date: NaiveDate, asset: &Asset) -> Option<Decimal> {
        let index = self.timeline.dates.binary_search(&date).ok()?;
        self.columns.get(asset).map(|column| column[index])
    }

    /// Fixes `asset` at a constant price for the whole timeline, e.g. the
    /// quote asset which has no market against itself.
    pub fn pin(&mut self, asset: Asset, price: Decimal) {
        self.columns.insert(asset, vec![price; self.timeline.len()]);
    }
}

/// Aligns `series` onto the union of their dates within `window`.
pub fn align(
    series: &BTreeMap<Asset, RawSeries>,
    window: &DateWindow,
) -> Result<AlignedTable, HistoryError> {
    let timeline = Timeline::from_series(series.values(), window);
    align_on(timeline, series)
}

/// Aligns `series` onto a caller supplied timeline.
pub fn align_on(
    timeline: Timeline,
    series: &BTreeMap<Asset, RawSeries>,
) -> Result<AlignedTable, HistoryError> {
    if timeline.is_empty() {
        return Err(HistoryError::EmptyTimeline);
    }

    let columns = series
        .iter()
        .map(|(asset, raw)| (asset.clone(), carry_forward(timeline.dates(), raw.points())))
        .collect();

    Ok(AlignedTable { timeline, columns })
}

fn carry_forward(dates: &[NaiveDate], points: &[PricePoint]) -> Vec<Decimal> {
    let mut column = Vec::with_capacity(dates.len());
    let mut current = Decimal::ZERO;
    let mut next = 0;

    for date in dates {
        while let Some(point) = points.get(next)
            && point.date <= *date
        {
            current = point.price;
            next += 1;
        }
        column.push(current);
    }

    column
}
