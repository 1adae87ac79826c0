//! Price acquisition layer - Yahoo Finance client plus caching
//!
//! Everything upstream of the returns core lives here: the chart-API
//! client, a process-wide TTL cache over per-ticker history fetches, the
//! batched universe refresh, and the on-disk price snapshot that lets the
//! dashboard run offline. The core only ever sees an already-built,
//! already-sorted `PriceTable`.

pub mod snapshot;
pub mod yahoo;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Duration, Local, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::error::DashError;
use crate::series::{PriceSeries, PriceTable};

/// Maximum concurrent API requests to avoid rate limiting
const MAX_CONCURRENT_REQUESTS: usize = 5;

/// In-memory history cache TTL
const HISTORY_TTL_HOURS: i64 = 12;

/// Fetch window: 3 years of history plus a buffer so the 3Yr window always
/// has an as-of candidate
const DEFAULT_LOOKBACK_DAYS: u64 = 365 * 3 + 30;

const PRICES_FILENAME: &str = "prices.json";
const PRICES_META_FILENAME: &str = "prices.meta.json";

/// Global singleton fetcher so the in-memory cache is shared across all
/// calls within a process.
static GLOBAL_FETCHER: Lazy<PriceFetcher> = Lazy::new(PriceFetcher::new);

/// Progress message surfaced to the CLI during long fetches
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

impl ProgressEvent {
    pub fn from_message(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Cache-only mode: never touch the network (`ETFDASH_OFFLINE=1`).
pub fn offline() -> bool {
    std::env::var("ETFDASH_OFFLINE")
        .map(|v| v != "0")
        .unwrap_or(false)
}

/// On-disk snapshot TTL, overridable via `ETFDASH_CACHE_TTL_HOURS`.
pub fn cache_ttl_hours() -> i64 {
    std::env::var("ETFDASH_CACHE_TTL_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(HISTORY_TTL_HOURS)
}

/// History fetch window, overridable via `ETFDASH_LOOKBACK_DAYS`.
pub fn lookback_days() -> u64 {
    std::env::var("ETFDASH_LOOKBACK_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LOOKBACK_DAYS)
}

pub fn get_cache_dir() -> Result<PathBuf> {
    let cache_dir = dir_spec::cache_home()
        .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("etfdash"))
}

/// History cache entry: one fetched range per ticker
#[derive(Debug, Clone)]
struct CacheEntry {
    observations: Vec<(NaiveDate, Option<rust_decimal::Decimal>)>,
    from: NaiveDate,
    to: NaiveDate,
    timestamp: DateTime<Utc>,
}

/// History fetcher with an in-memory TTL cache in front of the chart API
pub struct PriceFetcher {
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    cache_ttl_hours: i64,
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceFetcher {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
            cache_ttl_hours: HISTORY_TTL_HOURS,
        }
    }

    /// Fetch daily close history with caching. A cached entry is reused
    /// when it is fresh and covers the requested range.
    pub async fn fetch_history(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Option<rust_decimal::Decimal>)>> {
        {
            let cache = self.cache.lock().unwrap();
            if let Some(entry) = cache.get(ticker) {
                let age = Utc::now().signed_duration_since(entry.timestamp);
                if age < Duration::hours(self.cache_ttl_hours)
                    && entry.from <= from
                    && entry.to >= to
                {
                    debug!(
                        "Using cached history for {} (age: {}h)",
                        ticker,
                        age.num_hours()
                    );
                    return Ok(entry
                        .observations
                        .iter()
                        .filter(|(d, _)| *d >= from && *d <= to)
                        .cloned()
                        .collect());
                }
            }
        }

        info!("Fetching fresh history for {} from Yahoo Finance", ticker);
        let observations = yahoo::fetch_close_history(ticker, from, to)
            .await
            .context("Yahoo Finance history fetch failed")?;

        let mut cache = self.cache.lock().unwrap();
        cache.insert(
            ticker.to_string(),
            CacheEntry {
                observations: observations.clone(),
                from,
                to,
                timestamp: Utc::now(),
            },
        );
        Ok(observations)
    }

    #[allow(dead_code)]
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
        info!("History cache cleared");
    }

    pub fn cache_size(&self) -> usize {
        let cache = self.cache.lock().unwrap();
        cache.len()
    }
}

/// On-disk snapshot metadata
#[derive(Debug, Serialize, Deserialize)]
struct PricesMeta {
    fetched_at: DateTime<Utc>,
    lookback_days: u64,
    instruments: usize,
}

#[derive(Debug, Clone)]
pub struct PricesMetaInfo {
    pub fetched_at: DateTime<Utc>,
    pub instruments: usize,
}

fn resolve_cache_dir(cache_dir: Option<&Path>) -> Result<PathBuf> {
    match cache_dir {
        Some(path) => Ok(path.to_path_buf()),
        None => get_cache_dir(),
    }
}

/// Read snapshot metadata, `None` when no snapshot exists yet.
pub fn read_prices_meta(cache_dir: Option<&Path>) -> Result<Option<PricesMetaInfo>> {
    let dir = resolve_cache_dir(cache_dir)?;
    let meta_path = dir.join(PRICES_META_FILENAME);
    if !meta_path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&meta_path).context("Failed to read price snapshot metadata")?;
    let meta: PricesMeta =
        serde_json::from_slice(&bytes).context("Failed to parse price snapshot metadata")?;
    Ok(Some(PricesMetaInfo {
        fetched_at: meta.fetched_at,
        instruments: meta.instruments,
    }))
}

fn snapshot_is_stale(cache_dir: &Path) -> Result<bool> {
    match read_prices_meta(Some(cache_dir))? {
        Some(meta) => {
            let age = Utc::now().signed_duration_since(meta.fetched_at);
            Ok(age >= Duration::hours(cache_ttl_hours()))
        }
        None => Ok(true),
    }
}

/// Load the on-disk price table, `None` when no snapshot exists.
pub fn load_cached_table(cache_dir: Option<&Path>) -> Result<Option<PriceTable>> {
    let dir = resolve_cache_dir(cache_dir)?;
    let path = dir.join(PRICES_FILENAME);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path).context("Failed to read cached price table")?;
    let table: PriceTable = serde_json::from_slice(&bytes)
        .map_err(|e| DashError::CacheError(format!("corrupt price table: {}", e)))?;
    Ok(Some(table))
}

fn save_table(cache_dir: &Path, table: &PriceTable) -> Result<()> {
    fs::create_dir_all(cache_dir).context("Failed to create price cache directory")?;

    let path = cache_dir.join(PRICES_FILENAME);
    let tmp_path = cache_dir.join(format!("{}.tmp", PRICES_FILENAME));
    fs::write(&tmp_path, serde_json::to_vec(table)?).context("Failed to write price table")?;
    fs::rename(&tmp_path, &path).context("Failed to finalize price table snapshot")?;

    let meta = PricesMeta {
        fetched_at: Utc::now(),
        lookback_days: lookback_days(),
        instruments: table.len(),
    };
    let meta_path = cache_dir.join(PRICES_META_FILENAME);
    fs::write(&meta_path, serde_json::to_vec_pretty(&meta)?)
        .context("Failed to write price snapshot metadata")?;
    Ok(())
}

/// Fetch the whole universe in parallel with semaphore-based rate limiting.
/// Progress is reported as each ticker completes (completion order, not
/// spawn order). Per-ticker failures degrade to omission.
async fn fetch_universe<F>(
    from: NaiveDate,
    to: NaiveDate,
    progress: &mut F,
) -> Result<PriceTable>
where
    F: FnMut(&ProgressEvent),
{
    let tickers: Vec<&'static str> = catalog::tickers().collect();
    let total = tickers.len();
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS));
    let mut join_set = JoinSet::new();

    for ticker in tickers {
        let sem = semaphore.clone();
        join_set.spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let result = GLOBAL_FETCHER.fetch_history(ticker, from, to).await;
            (ticker, result)
        });
    }

    let mut table = PriceTable::new();
    let mut completed = 0;

    while let Some(joined) = join_set.join_next().await {
        let (ticker, fetch_result) = joined?;
        completed += 1;

        match fetch_result {
            Ok(observations) => {
                let series = PriceSeries::from_observations(ticker, &observations)?;
                progress(&ProgressEvent::from_message(&format!(
                    "{} → {} observations ({}/{})",
                    ticker,
                    series.len(),
                    completed,
                    total
                )));
                table.insert(ticker, series);
            }
            Err(e) => {
                // New listings and delistings fail routinely; skip, keep going.
                progress(&ProgressEvent::from_message(&format!(
                    "{} → failed ({}/{})",
                    ticker, completed, total
                )));
                warn!("Failed to fetch history for {}: {}", ticker, e);
            }
        }
    }

    Ok(table)
}

/// Refresh the on-disk price snapshot from the provider and return the new
/// table. `force` bypasses the freshness check.
pub async fn refresh_price_table<F>(force: bool, progress: &mut F) -> Result<PriceTable>
where
    F: FnMut(&ProgressEvent),
{
    let cache_dir = get_cache_dir()?;

    if !force && !snapshot_is_stale(&cache_dir)? {
        if let Some(table) = load_cached_table(Some(&cache_dir))? {
            debug!("Price snapshot is fresh, skipping refresh");
            progress(&ProgressEvent::from_message("✓ Prices are up to date"));
            return Ok(table);
        }
    }

    if offline() {
        anyhow::bail!("offline mode is set and the price snapshot is missing or stale");
    }

    let to = Local::now().date_naive();
    let from = to
        .checked_sub_days(Days::new(lookback_days()))
        .unwrap_or(to);

    progress(&ProgressEvent::from_message(&format!(
        "Fetching {} instruments ({} → {})...",
        catalog::UNIVERSE.len(),
        from,
        to
    )));

    let table = fetch_universe(from, to, progress).await?;
    save_table(&cache_dir, &table)?;
    info!(
        "Refreshed price snapshot: {} instruments with data",
        table.len()
    );
    progress(&ProgressEvent::from_message("✓ Price update complete"));

    Ok(table)
}

/// Load the price table for a read command: the cached snapshot when fresh
/// (always in offline mode), otherwise a refresh.
pub async fn load_price_table<F>(progress: &mut F) -> Result<PriceTable>
where
    F: FnMut(&ProgressEvent),
{
    let cache_dir = get_cache_dir()?;

    if offline() {
        return load_cached_table(Some(&cache_dir))?.ok_or_else(|| {
            anyhow::anyhow!(
                "offline mode is set but no price snapshot exists; run 'etfdash prices update' online first"
            )
        });
    }

    if !snapshot_is_stale(&cache_dir)? {
        if let Some(table) = load_cached_table(Some(&cache_dir))? {
            return Ok(table);
        }
    }

    refresh_price_table(true, progress).await
}
