//! Price history abstractions and core types

use super::asset::Asset;
use super::error::HistoryError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// The trailing period a history is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// The window `[end - period, end]`, `None` when the start falls outside
    /// the representable date range.
    pub fn trailing(end: DateTime<Utc>, period: Duration) -> Option<Self> {
        let start = end.checked_sub_signed(period)?;
        Some(Self { start, end })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }
}

/// One observed price of an asset, in the quote currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self { date, price }
    }
}

/// A price history ordered by ascending date with no duplicate dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeries {
    points: Vec<PricePoint>,
}

impl RawSeries {
    /// Sorts the points by date, keeping the last occurrence of a repeated date.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

impl FromIterator<PricePoint> for RawSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetches the daily price history of `asset` within `window`.
    async fn get_price_history(
        &self,
        asset: &Asset,
        window: &DateWindow,
    ) -> Result<RawSeries, HistoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_raw_series_sorts_and_dedups() {
        let series = RawSeries::new(vec![
            PricePoint::new(day(3), Decimal::from(3)),
            PricePoint::new(day(1), Decimal::from(1)),
            PricePoint::new(day(3), Decimal::from(4)),
            PricePoint::new(day(2), Decimal::from(2)),
        ]);

        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        // Last occurrence wins
        assert_eq!(series.points()[2].price, Decimal::from(4));
    }

    #[test]
    fn test_empty_series() {
        let series = RawSeries::empty();
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
    }

    #[test]
    fn test_trailing_window() {
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 15, 0, 0).unwrap();
        let window = DateWindow::trailing(end, Duration::days(365)).unwrap();

        assert_eq!(window.start_date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(window.end_date(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    }

    #[test]
    fn test_trailing_window_out_of_range() {
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert!(DateWindow::trailing(end, Duration::days(365 * 1_000_000)).is_none());
    }
}
