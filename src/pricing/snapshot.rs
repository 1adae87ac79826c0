//! Keyed fundamentals snapshot (NAV, AUM, P/E, P/B, yield)
//!
//! Fundamental metrics change slowly and the provider endpoint for them is
//! unreliable from shared hosts, so they live in an explicitly refreshed
//! JSON snapshot under the cache dir rather than being fetched per render.
//! A missing snapshot degrades the dashboard to performance-only columns.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::catalog;
use crate::pricing::{yahoo, ProgressEvent, MAX_CONCURRENT_REQUESTS};

const SNAPSHOT_FILENAME: &str = "fundamentals.json";

/// Snapshot age beyond which `status` reports it as stale
const SNAPSHOT_STALE_HOURS: i64 = 24;

/// Fundamental metrics for one instrument; all metrics optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalsRow {
    pub ticker: String,
    pub price: Option<Decimal>,
    pub nav: Option<Decimal>,
    pub premium_pct: Option<Decimal>,
    pub total_assets: Option<Decimal>,
    pub trailing_pe: Option<Decimal>,
    pub price_to_book: Option<Decimal>,
    pub dividend_yield_pct: Option<Decimal>,
}

/// The whole snapshot, keyed by ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub rows: BTreeMap<String, FundamentalsRow>,
}

impl FundamentalsSnapshot {
    pub fn get(&self, ticker: &str) -> Option<&FundamentalsRow> {
        self.rows.get(ticker)
    }

    pub fn is_stale(&self) -> bool {
        Utc::now().signed_duration_since(self.fetched_at) >= Duration::hours(SNAPSHOT_STALE_HOURS)
    }
}

/// Premium/discount of price over NAV in percent, absent unless both
/// inputs are usable.
pub fn premium_pct(price: Option<Decimal>, nav: Option<Decimal>) -> Option<Decimal> {
    let price = price?;
    let nav = nav?;
    if nav <= Decimal::ZERO {
        return None;
    }
    Some((price - nav) / nav * Decimal::from(100))
}

fn snapshot_path(cache_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match cache_dir {
        Some(path) => path.to_path_buf(),
        None => super::get_cache_dir()?,
    };
    Ok(dir.join(SNAPSHOT_FILENAME))
}

/// Load the snapshot, `None` when it has never been fetched.
pub fn load(cache_dir: Option<&Path>) -> Result<Option<FundamentalsSnapshot>> {
    let path = snapshot_path(cache_dir)?;
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path).context("Failed to read fundamentals snapshot")?;
    let snapshot =
        serde_json::from_slice(&bytes).context("Failed to parse fundamentals snapshot")?;
    Ok(Some(snapshot))
}

pub fn save(cache_dir: Option<&Path>, snapshot: &FundamentalsSnapshot) -> Result<()> {
    let path = snapshot_path(cache_dir)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, serde_json::to_vec_pretty(snapshot)?)
        .context("Failed to write fundamentals snapshot")?;
    fs::rename(&tmp_path, &path).context("Failed to finalize fundamentals snapshot")?;
    Ok(())
}

/// Refresh the snapshot from the provider for the whole universe.
///
/// Per-ticker failures are skipped with a warning; the refreshed snapshot
/// simply lacks those rows. `force` skips the freshness short-circuit.
pub async fn refresh<F>(force: bool, progress: &mut F) -> Result<FundamentalsSnapshot>
where
    F: FnMut(&ProgressEvent),
{
    if !force {
        if let Some(existing) = load(None)? {
            if !existing.is_stale() {
                progress(&ProgressEvent::from_message(
                    "✓ Fundamentals snapshot is up to date",
                ));
                return Ok(existing);
            }
        }
    }

    if super::offline() {
        anyhow::bail!("offline mode is set; cannot refresh the fundamentals snapshot");
    }

    let tickers: Vec<&'static str> = catalog::tickers().collect();
    let total = tickers.len();
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS));
    let mut join_set = JoinSet::new();

    for ticker in tickers {
        let sem = semaphore.clone();
        join_set.spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let result = yahoo::fetch_fundamentals(ticker).await;
            (ticker, result)
        });
    }

    let mut rows = BTreeMap::new();
    let mut completed = 0;

    while let Some(joined) = join_set.join_next().await {
        let (ticker, fetch_result) = joined?;
        completed += 1;

        match fetch_result {
            Ok(fund) => {
                progress(&ProgressEvent::from_message(&format!(
                    "{} → fundamentals ({}/{})",
                    ticker, completed, total
                )));
                rows.insert(
                    ticker.to_string(),
                    FundamentalsRow {
                        ticker: ticker.to_string(),
                        premium_pct: premium_pct(fund.previous_close, fund.nav),
                        price: fund.previous_close,
                        nav: fund.nav,
                        total_assets: fund.total_assets,
                        trailing_pe: fund.trailing_pe,
                        price_to_book: fund.price_to_book,
                        dividend_yield_pct: fund.dividend_yield,
                    },
                );
            }
            Err(e) => {
                progress(&ProgressEvent::from_message(&format!(
                    "{} → failed ({}/{})",
                    ticker, completed, total
                )));
                warn!("Failed to fetch fundamentals for {}: {}", ticker, e);
            }
        }
    }

    let snapshot = FundamentalsSnapshot {
        fetched_at: Utc::now(),
        rows,
    };
    save(None, &snapshot)?;
    info!(
        "Refreshed fundamentals snapshot: {} of {} instruments",
        snapshot.rows.len(),
        total
    );
    progress(&ProgressEvent::from_message("✓ Fundamentals refresh complete"));

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sample_snapshot() -> FundamentalsSnapshot {
        let mut rows = BTreeMap::new();
        rows.insert(
            "2559.T".to_string(),
            FundamentalsRow {
                ticker: "2559.T".to_string(),
                price: Some(dec!(21500)),
                nav: Some(dec!(21400)),
                premium_pct: premium_pct(Some(dec!(21500)), Some(dec!(21400))),
                total_assets: Some(dec!(250000000000)),
                trailing_pe: Some(dec!(18.2)),
                price_to_book: None,
                dividend_yield_pct: Some(dec!(1.4)),
            },
        );
        FundamentalsSnapshot {
            fetched_at: Utc::now(),
            rows,
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let snapshot = sample_snapshot();
        save(Some(dir.path()), &snapshot).unwrap();

        let loaded = load(Some(dir.path())).unwrap().unwrap();
        let row = loaded.get("2559.T").unwrap();
        assert_eq!(row.price, Some(dec!(21500)));
        assert_eq!(row.price_to_book, None);
    }

    #[test]
    fn test_load_missing_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(dir.path())).unwrap().is_none());
    }

    #[test]
    fn test_fresh_snapshot_not_stale() {
        assert!(!sample_snapshot().is_stale());
    }

    #[test]
    fn test_old_snapshot_is_stale() {
        let mut snapshot = sample_snapshot();
        snapshot.fetched_at = Utc::now() - Duration::hours(SNAPSHOT_STALE_HOURS + 1);
        assert!(snapshot.is_stale());
    }

    #[test]
    fn test_premium_pct_requires_both_inputs() {
        assert_eq!(premium_pct(Some(dec!(100)), None), None);
        assert_eq!(premium_pct(None, Some(dec!(100))), None);
        assert_eq!(
            premium_pct(Some(dec!(102)), Some(dec!(100))),
            Some(dec!(2))
        );
    }

    #[test]
    fn test_premium_pct_zero_nav_guarded() {
        assert_eq!(premium_pct(Some(dec!(100)), Some(dec!(0))), None);
    }
}
