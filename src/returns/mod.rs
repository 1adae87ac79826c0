//! Multi-window return calculation
//!
//! For each instrument the engine computes rolling (1D..5Yr) and
//! calendar-aligned (MTD/QTD/YTD) percentage returns, every window anchored
//! to the instrument's *own* last observation. A Friday close on an illiquid
//! foreign listing is never compared against a Monday target shared with a
//! liquid domestic one.
//!
//! The engine never fails on per-instrument data: a window without a
//! qualifying prior observation, or with a zero/negative base price, is
//! absent in the row rather than NaN, infinity or an error.

pub mod calendar;
pub mod rebase;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::series::PriceTable;

/// The fixed set of return windows shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Window {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    Mtd,
    Qtd,
    Ytd,
    OneYear,
    ThreeYears,
    FiveYears,
}

// Serialized as the display label so JSON consumers see "1D"/"MTD"/...
// instead of variant names.
impl serde::Serialize for Window {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl Window {
    /// All windows in dashboard column order.
    pub const ALL: [Window; 10] = [
        Window::OneDay,
        Window::OneWeek,
        Window::OneMonth,
        Window::ThreeMonths,
        Window::Mtd,
        Window::Qtd,
        Window::Ytd,
        Window::OneYear,
        Window::ThreeYears,
        Window::FiveYears,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Window::OneDay => "1D",
            Window::OneWeek => "1W",
            Window::OneMonth => "1M",
            Window::ThreeMonths => "3M",
            Window::Mtd => "MTD",
            Window::Qtd => "QTD",
            Window::Ytd => "YTD",
            Window::OneYear => "1Yr",
            Window::ThreeYears => "3Yr",
            Window::FiveYears => "5Yr",
        }
    }

    /// Rolling lag in calendar days, or `None` for calendar-aligned windows.
    fn lag_days(&self) -> Option<u64> {
        match self {
            Window::OneDay => Some(1),
            Window::OneWeek => Some(7),
            Window::OneMonth => Some(30),
            Window::ThreeMonths => Some(91),
            Window::OneYear => Some(365),
            Window::ThreeYears => Some(365 * 3),
            Window::FiveYears => Some(365 * 5),
            Window::Mtd | Window::Qtd | Window::Ytd => None,
        }
    }

    /// As-of target for this window, framed by the instrument's own anchor.
    fn target_date(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Window::Mtd => calendar::end_of_prior_month(anchor),
            Window::Qtd => calendar::end_of_prior_quarter(anchor),
            Window::Ytd => calendar::end_of_prior_year(anchor),
            _ => anchor.checked_sub_days(Days::new(self.lag_days()?)),
        }
    }
}

/// Computed returns for one instrument, immutable once assembled.
///
/// A window missing from `windows` means insufficient history (or an
/// invalid base price), not zero.
#[derive(Debug, Clone)]
pub struct ReturnRow {
    pub ticker: String,
    pub last_date: NaiveDate,
    pub last_price: Decimal,
    windows: BTreeMap<Window, Decimal>,
}

impl ReturnRow {
    pub fn get(&self, window: Window) -> Option<Decimal> {
        self.windows.get(&window).copied()
    }

    /// Windows that resolved to a value.
    pub fn present(&self) -> impl Iterator<Item = (Window, Decimal)> + '_ {
        self.windows.iter().map(|(w, v)| (*w, *v))
    }
}

/// Percentage change from `start` to `last`, or `None` when the base price
/// cannot anchor a return. The explicit guard keeps a zero base from ever
/// leaking through as infinity.
pub(crate) fn pct_change(last: Decimal, start: Decimal) -> Option<Decimal> {
    if start <= Decimal::ZERO {
        return None;
    }
    Some((last - start) / start * Decimal::from(100))
}

/// Compute one `ReturnRow` per instrument in the table.
///
/// Instruments with no valid observations contribute no row at all (the
/// table already omits empty series); every other data issue degrades to an
/// absent window value.
pub fn compute(table: &PriceTable) -> BTreeMap<String, ReturnRow> {
    let mut rows = BTreeMap::new();

    for (ticker, series) in table.iter() {
        let Some(last) = series.last() else {
            continue;
        };

        let mut windows = BTreeMap::new();
        for window in Window::ALL {
            let value = window
                .target_date(last.date)
                .and_then(|target| series.as_of(target))
                .and_then(|start| pct_change(last.close, start.close));
            if let Some(v) = value {
                windows.insert(window, v);
            }
        }

        tracing::debug!(
            "{}: {} of {} windows resolved (anchor {})",
            ticker,
            windows.len(),
            Window::ALL.len(),
            last.date
        );

        rows.insert(
            ticker.clone(),
            ReturnRow {
                ticker: ticker.clone(),
                last_date: last.date,
                last_price: last.close,
                windows,
            },
        );
    }

    rows
}
