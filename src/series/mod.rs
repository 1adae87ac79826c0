//! Price series store and as-of resolution
//!
//! One `PriceSeries` per instrument, one `PriceTable` per refresh cycle.
//! Series are built once from raw provider observations and never mutated
//! in place afterwards. Gap handling happens here, at ingestion:
//!
//! - unsorted or duplicate dates are a contract violation from the
//!   acquisition layer and fail fast (`DashError::MalformedSeries`);
//! - leading/trailing gaps are dropped so every instrument keeps its own
//!   first/last observation anchor;
//! - interior gaps are forward-filled with the most recent prior close;
//! - non-positive closes are treated as gaps, never stored.
//!
//! Instruments trade on different calendars (JPX holidays vs foreign
//! listings), so nothing in this module assumes a shared "today".

use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::DashError;

/// A single daily close observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Ordered daily close history for one instrument.
///
/// Invariant: dates strictly increasing, closes strictly positive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from raw (date, close-or-gap) observations.
    ///
    /// Fails fast on unsorted or duplicate dates; every other data issue
    /// (gaps, non-positive closes) degrades to forward-fill or omission.
    pub fn from_observations(
        ticker: &str,
        observations: &[(NaiveDate, Option<Decimal>)],
    ) -> Result<Self> {
        for pair in observations.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(DashError::MalformedSeries {
                    ticker: ticker.to_string(),
                    reason: format!("dates not strictly increasing at {}", pair[1].0),
                }
                .into());
            }
        }

        let mut points = Vec::with_capacity(observations.len());
        let mut last_close: Option<Decimal> = None;
        for &(date, close) in observations {
            match close {
                Some(c) if c > Decimal::ZERO => {
                    points.push(PricePoint { date, close: c });
                    last_close = Some(c);
                }
                Some(_) | None => {
                    // Interior gap: carry the prior close forward.
                    // Leading gaps have no prior close and are dropped.
                    if let Some(prev) = last_close {
                        points.push(PricePoint { date, close: prev });
                    }
                }
            }
        }

        // Trailing forward-filled runs would pin a stale close to dates the
        // instrument never traded on; trim back to the last real observation.
        let last_observed = observations
            .iter()
            .rev()
            .find(|(_, c)| matches!(c, Some(v) if *v > Decimal::ZERO))
            .map(|(d, _)| *d);
        if let Some(last_date) = last_observed {
            points.truncate(points.partition_point(|p| p.date <= last_date));
        }

        Ok(Self { points })
    }

    /// Latest observation at or before `target`, or `None` when the series
    /// is empty or starts after `target`.
    ///
    /// This is the single lookup shared by every window calculation: a new
    /// listing, a data gap longer than the lookback and a corrupted fetch
    /// all surface as the same "insufficient history" outcome.
    pub fn as_of(&self, target: NaiveDate) -> Option<PricePoint> {
        let idx = self.points.partition_point(|p| p.date <= target);
        if idx == 0 {
            None
        } else {
            Some(self.points[idx - 1])
        }
    }

    pub fn first(&self) -> Option<PricePoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<PricePoint> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All instrument series for one refresh cycle, keyed by ticker.
///
/// Rebuilt whole on every refresh; empty series are not stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series; instruments with zero valid observations are
    /// silently omitted rather than stored empty.
    pub fn insert(&mut self, ticker: impl Into<String>, series: PriceSeries) {
        if !series.is_empty() {
            self.series.insert(ticker.into(), series);
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&PriceSeries> {
        self.series.get(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PriceSeries)> {
        self.series.iter()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Most recent observation date across all instruments ("Data as of").
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.series
            .values()
            .filter_map(|s| s.last().map(|p| p.date))
            .max()
    }

    /// Keep only the given tickers (category filtering).
    pub fn retain_tickers<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.series.retain(|ticker, _| keep(ticker));
    }

    /// Project the table onto a date window for chart display.
    ///
    /// The slice axis is the union of observation dates in range. Each
    /// column holds the as-of close per axis date, absent outside the
    /// instrument's own first..last span.
    pub fn slice(&self, from: NaiveDate, to: NaiveDate) -> TableSlice {
        let dates: Vec<NaiveDate> = self
            .series
            .values()
            .flat_map(|s| s.points().iter().map(|p| p.date))
            .filter(|d| *d >= from && *d <= to)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut columns = BTreeMap::new();
        for (ticker, series) in &self.series {
            let (first, last) = match (series.first(), series.last()) {
                (Some(f), Some(l)) => (f.date, l.date),
                _ => continue,
            };
            let values = dates
                .iter()
                .map(|&d| {
                    if d < first || d > last {
                        None
                    } else {
                        series.as_of(d).map(|p| p.close)
                    }
                })
                .collect();
            columns.insert(ticker.clone(), values);
        }

        TableSlice { dates, columns }
    }

    /// Slice by a display timeframe, anchored to the table's latest date.
    pub fn slice_timeframe(&self, timeframe: Timeframe) -> TableSlice {
        let Some(end) = self.last_date() else {
            return TableSlice::default();
        };
        let start = timeframe
            .start_date(end)
            .or_else(|| {
                self.series
                    .values()
                    .filter_map(|s| s.first().map(|p| p.date))
                    .min()
            })
            .unwrap_or(end);
        self.slice(start, end)
    }
}

/// A windowed, column-aligned view of the table, ready for rebasing.
///
/// Same shape in and out of `returns::rebase`: one shared date axis, one
/// optional value per (date, ticker) cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableSlice {
    pub dates: Vec<NaiveDate>,
    pub columns: BTreeMap<String, Vec<Option<Decimal>>>,
}

impl TableSlice {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }
}

/// Display-range selector for the chart view.
///
/// Distinct from return windows: a `3M` chart slices 90 days back while the
/// `3M` return column uses a 91-day lag, and the calendar variants start at
/// the period's first day rather than the prior period's close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    OneYear,
    ThreeYears,
    Mtd,
    Qtd,
    Ytd,
    Max,
}

impl Timeframe {
    pub fn parse(input: &str) -> Result<Self> {
        match input.to_uppercase().as_str() {
            "1D" => Ok(Self::OneDay),
            "1W" => Ok(Self::OneWeek),
            "1M" => Ok(Self::OneMonth),
            "3M" => Ok(Self::ThreeMonths),
            "1YR" | "1Y" => Ok(Self::OneYear),
            "3YR" | "3Y" => Ok(Self::ThreeYears),
            "MTD" => Ok(Self::Mtd),
            "QTD" => Ok(Self::Qtd),
            "YTD" => Ok(Self::Ytd),
            "MAX" => Ok(Self::Max),
            other => Err(anyhow::anyhow!(
                "invalid timeframe '{}'. Use: 1D, 1W, 1M, 3M, 1Yr, 3Yr, MTD, QTD, YTD, or MAX",
                other
            )),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::OneYear => "1Yr",
            Self::ThreeYears => "3Yr",
            Self::Mtd => "MTD",
            Self::Qtd => "QTD",
            Self::Ytd => "YTD",
            Self::Max => "MAX",
        }
    }

    /// Slice start for a given end date; `None` means "from the beginning".
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        let days_back = |n: u64| end.checked_sub_days(Days::new(n));
        match self {
            Self::OneDay => days_back(1),
            Self::OneWeek => days_back(7),
            Self::OneMonth => days_back(30),
            Self::ThreeMonths => days_back(90),
            Self::OneYear => days_back(365),
            Self::ThreeYears => days_back(365 * 3),
            Self::Mtd => NaiveDate::from_ymd_opt(end.year(), end.month(), 1),
            Self::Qtd => {
                let quarter_start_month = ((end.month() - 1) / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(end.year(), quarter_start_month, 1)
            }
            Self::Ytd => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Self::Max => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(obs: &[(NaiveDate, Option<Decimal>)]) -> PriceSeries {
        PriceSeries::from_observations("TEST.T", obs).unwrap()
    }

    #[test]
    fn test_from_observations_rejects_unsorted_dates() {
        let obs = vec![
            (date(2024, 1, 5), Some(dec!(100))),
            (date(2024, 1, 4), Some(dec!(101))),
        ];
        let err = PriceSeries::from_observations("1306.T", &obs).unwrap_err();
        assert!(err.to_string().contains("not strictly increasing"));
    }

    #[test]
    fn test_from_observations_rejects_duplicate_dates() {
        let obs = vec![
            (date(2024, 1, 5), Some(dec!(100))),
            (date(2024, 1, 5), Some(dec!(100))),
        ];
        assert!(PriceSeries::from_observations("1306.T", &obs).is_err());
    }

    #[test]
    fn test_leading_gaps_dropped() {
        let s = series(&[
            (date(2024, 1, 4), None),
            (date(2024, 1, 5), None),
            (date(2024, 1, 9), Some(dec!(200))),
        ]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.first().unwrap().date, date(2024, 1, 9));
    }

    #[test]
    fn test_interior_gaps_forward_filled() {
        let s = series(&[
            (date(2024, 1, 4), Some(dec!(100))),
            (date(2024, 1, 5), None),
            (date(2024, 1, 9), Some(dec!(200))),
        ]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.points()[1].close, dec!(100));
    }

    #[test]
    fn test_trailing_gaps_dropped() {
        // A stale forward-filled tail would shift the instrument's anchor
        // past its real last trade.
        let s = series(&[
            (date(2024, 1, 4), Some(dec!(100))),
            (date(2024, 1, 5), None),
            (date(2024, 1, 9), None),
        ]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.last().unwrap().date, date(2024, 1, 4));
    }

    #[test]
    fn test_non_positive_close_is_a_gap() {
        let s = series(&[
            (date(2024, 1, 4), Some(dec!(100))),
            (date(2024, 1, 5), Some(dec!(0))),
            (date(2024, 1, 9), Some(dec!(110))),
        ]);
        assert_eq!(s.points()[1].close, dec!(100));
    }

    #[test]
    fn test_as_of_before_all_dates_is_none() {
        let s = series(&[
            (date(2024, 1, 4), Some(dec!(100))),
            (date(2024, 1, 5), Some(dec!(101))),
        ]);
        assert!(s.as_of(date(2024, 1, 3)).is_none());
    }

    #[test]
    fn test_as_of_at_or_after_last_returns_last() {
        let s = series(&[
            (date(2024, 1, 4), Some(dec!(100))),
            (date(2024, 1, 5), Some(dec!(101))),
        ]);
        assert_eq!(s.as_of(date(2024, 1, 5)).unwrap().close, dec!(101));
        assert_eq!(s.as_of(date(2025, 6, 1)).unwrap().close, dec!(101));
    }

    #[test]
    fn test_as_of_skips_non_trading_days() {
        let s = series(&[
            (date(2024, 1, 4), Some(dec!(100))),
            (date(2024, 1, 9), Some(dec!(105))),
        ]);
        // Weekend/holiday target resolves to the prior close.
        let hit = s.as_of(date(2024, 1, 7)).unwrap();
        assert_eq!(hit.date, date(2024, 1, 4));
        assert_eq!(hit.close, dec!(100));
    }

    #[test]
    fn test_as_of_empty_series_is_none() {
        let s = PriceSeries::default();
        assert!(s.as_of(date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_table_omits_empty_series() {
        let mut table = PriceTable::new();
        table.insert("1306.T", PriceSeries::default());
        assert!(table.is_empty());
        assert!(table.get("1306.T").is_none());
    }

    #[test]
    fn test_table_last_date_is_max_across_instruments() {
        let mut table = PriceTable::new();
        table.insert(
            "AAAA.T",
            series(&[(date(2024, 1, 5), Some(dec!(100)))]),
        );
        table.insert(
            "BBBB.T",
            series(&[(date(2024, 1, 10), Some(dec!(50)))]),
        );
        assert_eq!(table.last_date(), Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_slice_absent_outside_instrument_span() {
        let mut table = PriceTable::new();
        table.insert(
            "EARLY.T",
            series(&[
                (date(2024, 1, 4), Some(dec!(100))),
                (date(2024, 1, 5), Some(dec!(101))),
            ]),
        );
        table.insert(
            "LATE.T",
            series(&[(date(2024, 1, 5), Some(dec!(50)))]),
        );

        let slice = table.slice(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(slice.dates, vec![date(2024, 1, 4), date(2024, 1, 5)]);
        assert_eq!(
            slice.columns["LATE.T"],
            vec![None, Some(dec!(50))],
            "late listing must be absent before its first observation"
        );
        assert_eq!(
            slice.columns["EARLY.T"],
            vec![Some(dec!(100)), Some(dec!(101))]
        );
    }

    #[test]
    fn test_slice_forward_fills_within_span() {
        let mut table = PriceTable::new();
        table.insert(
            "GAPPY.T",
            series(&[
                (date(2024, 1, 4), Some(dec!(100))),
                (date(2024, 1, 9), Some(dec!(105))),
            ]),
        );
        table.insert(
            "DAILY.T",
            series(&[
                (date(2024, 1, 4), Some(dec!(10))),
                (date(2024, 1, 5), Some(dec!(11))),
                (date(2024, 1, 9), Some(dec!(12))),
            ]),
        );

        let slice = table.slice(date(2024, 1, 4), date(2024, 1, 9));
        // GAPPY has no Jan 5 observation; the axis date comes from DAILY and
        // GAPPY forward-fills its Jan 4 close onto it.
        assert_eq!(
            slice.columns["GAPPY.T"],
            vec![Some(dec!(100)), Some(dec!(100)), Some(dec!(105))]
        );
    }

    #[test]
    fn test_timeframe_parse_round_trip() {
        for label in ["1D", "1W", "1M", "3M", "1Yr", "3Yr", "MTD", "QTD", "YTD", "MAX"] {
            let tf = Timeframe::parse(label).unwrap();
            assert_eq!(tf.label(), label);
        }
        assert!(Timeframe::parse("2W").is_err());
    }

    #[test]
    fn test_timeframe_calendar_starts() {
        let end = date(2024, 8, 20);
        assert_eq!(Timeframe::Mtd.start_date(end), Some(date(2024, 8, 1)));
        assert_eq!(Timeframe::Qtd.start_date(end), Some(date(2024, 7, 1)));
        assert_eq!(Timeframe::Ytd.start_date(end), Some(date(2024, 1, 1)));
        assert_eq!(Timeframe::Max.start_date(end), None);
    }

    #[test]
    fn test_timeframe_rolling_starts() {
        let end = date(2024, 8, 20);
        assert_eq!(Timeframe::ThreeMonths.start_date(end), Some(date(2024, 5, 22)));
        assert_eq!(Timeframe::OneWeek.start_date(end), Some(date(2024, 8, 13)));
    }
}
