//! Dashboard row assembly: returns ⋈ fundamentals ⋈ catalog
//!
//! The join is left-outer from the catalog: every instrument in the tracked
//! universe (after the optional category filter) gets a row, even when no
//! price data resolved for it. Missing pieces stay `None` and render blank.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::catalog::{self, Category};
use crate::pricing::snapshot::{FundamentalsRow, FundamentalsSnapshot};
use crate::returns::{ReturnRow, Window};

/// Row ordering for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Catalog order: grouped by category, then listing order
    Category,
    /// Descending YTD return; instruments without a YTD value sink to the end
    Ytd,
}

impl SortKey {
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "category" => Some(SortKey::Category),
            "ytd" => Some(SortKey::Ytd),
            _ => None,
        }
    }
}

/// One display-ready dashboard row
#[derive(Debug, Clone, Serialize)]
pub struct DashboardRow {
    pub ticker: &'static str,
    pub index_name: &'static str,
    pub fund_name: &'static str,
    pub category: Category,
    pub last_date: Option<NaiveDate>,
    pub last_price: Option<Decimal>,
    pub windows: BTreeMap<Window, Decimal>,
    pub fundamentals: Option<FundamentalsRow>,
}

impl DashboardRow {
    pub fn window(&self, window: Window) -> Option<Decimal> {
        self.windows.get(&window).copied()
    }
}

/// The assembled dashboard
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub rows: Vec<DashboardRow>,
    /// When the attached fundamentals were fetched; `None` means the
    /// snapshot was unavailable and rows carry performance columns only.
    pub snapshot_fetched_at: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn has_fundamentals(&self) -> bool {
        self.snapshot_fetched_at.is_some()
    }
}

/// Assemble dashboard rows from the computed returns, the optional
/// fundamentals snapshot and the static catalog.
pub fn build(
    returns: &BTreeMap<String, ReturnRow>,
    snapshot: Option<&FundamentalsSnapshot>,
    category: Option<Category>,
    sort: SortKey,
) -> Dashboard {
    let mut rows: Vec<DashboardRow> = catalog::UNIVERSE
        .iter()
        .filter(|meta| category.map_or(true, |c| meta.category == c))
        .map(|meta| {
            let computed = returns.get(meta.ticker);
            DashboardRow {
                ticker: meta.ticker,
                index_name: meta.index_name,
                fund_name: meta.fund_name,
                category: meta.category,
                last_date: computed.map(|r| r.last_date),
                last_price: computed.map(|r| r.last_price),
                windows: computed
                    .map(|r| r.present().collect())
                    .unwrap_or_default(),
                fundamentals: snapshot
                    .and_then(|s| s.get(meta.ticker))
                    .cloned(),
            }
        })
        .collect();

    if sort == SortKey::Ytd {
        // Stable sort keeps catalog order among ties and among the
        // trailing no-YTD rows.
        rows.sort_by(|a, b| {
            match (a.window(Window::Ytd), b.window(Window::Ytd)) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }

    Dashboard {
        rows,
        snapshot_fetched_at: snapshot.map(|s| s.fetched_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{PriceSeries, PriceTable};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn returns_for(entries: &[(&str, Decimal, Decimal)]) -> BTreeMap<String, ReturnRow> {
        // A prior-year close plus two June observations, so 1W and YTD both
        // resolve from the chosen prices.
        let mut table = PriceTable::new();
        for (ticker, start, last) in entries {
            let obs = vec![
                (date(2023, 12, 29), Some(*start)),
                (date(2024, 6, 10), Some(*start)),
                (date(2024, 6, 17), Some(*last)),
            ];
            table.insert(
                ticker.to_string(),
                PriceSeries::from_observations(ticker, &obs).unwrap(),
            );
        }
        crate::returns::compute(&table)
    }

    fn snapshot_with(ticker: &str) -> FundamentalsSnapshot {
        let mut rows = BTreeMap::new();
        rows.insert(
            ticker.to_string(),
            FundamentalsRow {
                ticker: ticker.to_string(),
                price: Some(dec!(100)),
                nav: Some(dec!(99)),
                premium_pct: None,
                total_assets: None,
                trailing_pe: None,
                price_to_book: None,
                dividend_yield_pct: None,
            },
        );
        FundamentalsSnapshot {
            fetched_at: Utc::now(),
            rows,
        }
    }

    #[test]
    fn test_every_catalog_instrument_gets_a_row() {
        let dashboard = build(&BTreeMap::new(), None, None, SortKey::Category);
        assert_eq!(dashboard.rows.len(), catalog::UNIVERSE.len());
        assert!(dashboard.rows.iter().all(|r| r.last_price.is_none()));
        assert!(!dashboard.has_fundamentals());
    }

    #[test]
    fn test_category_filter_narrows_rows() {
        let dashboard = build(
            &BTreeMap::new(),
            None,
            Some(Category::Enhanced),
            SortKey::Category,
        );
        assert!(!dashboard.rows.is_empty());
        assert!(dashboard
            .rows
            .iter()
            .all(|r| r.category == Category::Enhanced));
    }

    #[test]
    fn test_returns_join_by_ticker() {
        let returns = returns_for(&[("2559.T", dec!(100), dec!(110))]);
        let dashboard = build(&returns, None, None, SortKey::Category);

        let row = dashboard
            .rows
            .iter()
            .find(|r| r.ticker == "2559.T")
            .unwrap();
        assert_eq!(row.last_price, Some(dec!(110)));
        assert_eq!(row.window(Window::OneWeek), Some(dec!(10)));

        let other = dashboard
            .rows
            .iter()
            .find(|r| r.ticker != "2559.T")
            .unwrap();
        assert_eq!(other.last_price, None);
        assert!(other.windows.is_empty());
    }

    #[test]
    fn test_fundamentals_attach_where_present() {
        let snapshot = snapshot_with("2559.T");
        let dashboard = build(&BTreeMap::new(), Some(&snapshot), None, SortKey::Category);

        assert!(dashboard.has_fundamentals());
        let row = dashboard
            .rows
            .iter()
            .find(|r| r.ticker == "2559.T")
            .unwrap();
        assert_eq!(
            row.fundamentals.as_ref().unwrap().nav,
            Some(dec!(99))
        );
        let other = dashboard
            .rows
            .iter()
            .find(|r| r.ticker != "2559.T")
            .unwrap();
        assert!(other.fundamentals.is_none());
    }

    #[test]
    fn test_ytd_sort_descending_absent_last() {
        let returns = returns_for(&[
            ("2559.T", dec!(100), dec!(105)),
            ("1477.T", dec!(100), dec!(120)),
        ]);
        let dashboard = build(&returns, None, None, SortKey::Ytd);

        assert_eq!(dashboard.rows[0].ticker, "1477.T");
        assert_eq!(dashboard.rows[1].ticker, "2559.T");
        assert!(dashboard.rows[2..]
            .iter()
            .all(|r| r.window(Window::Ytd).is_none()));
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("ytd"), Some(SortKey::Ytd));
        assert_eq!(SortKey::parse("Category"), Some(SortKey::Category));
        assert_eq!(SortKey::parse("alpha"), None);
    }
}
