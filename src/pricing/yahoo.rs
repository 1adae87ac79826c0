use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DashError;

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Yahoo Finance quoteSummary response (fundamentals)
#[derive(Debug, Deserialize)]
struct YahooSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryData,
}

#[derive(Debug, Deserialize)]
struct SummaryData {
    result: Option<Vec<SummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatistics>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "previousClose")]
    previous_close: Option<RawValue>,
    #[serde(rename = "navPrice")]
    nav_price: Option<RawValue>,
    #[serde(rename = "totalAssets")]
    total_assets: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "yield")]
    dividend_yield: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatistics {
    #[serde(rename = "priceToBook")]
    price_to_book: Option<RawValue>,
}

/// Yahoo wraps every numeric field as `{"raw": 1.23, "fmt": "1.23"}`
#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    /// Lossless conversion to Decimal; NaN/infinity become absent.
    fn to_decimal(opt: Option<Self>) -> Option<Decimal> {
        opt.and_then(|v| v.raw).and_then(Decimal::from_f64_retain)
    }
}

/// Fundamental metrics for one instrument; every field optional because the
/// provider omits them freely for thinly covered listings
#[derive(Debug, Clone, Default, Serialize)]
pub struct Fundamentals {
    pub previous_close: Option<Decimal>,
    pub nav: Option<Decimal>,
    pub total_assets: Option<Decimal>,
    pub trailing_pe: Option<Decimal>,
    pub price_to_book: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
}

fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent("Mozilla/5.0 (compatible; EtfdashBot/1.0)")
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch daily close history from Yahoo Finance.
///
/// JPX tickers already carry their `.T` suffix in the catalog, so the symbol
/// is used verbatim. Missing closes come back as gaps (`None`), not errors:
/// new listings and holiday holes are expected, and the series store decides
/// what to do with them.
pub async fn fetch_close_history(
    ticker: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(NaiveDate, Option<Decimal>)>> {
    info!("Fetching close history for {} from {} to {}", ticker, from, to);

    let client = build_client()?;

    let from_timestamp = from
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("Invalid from date"))?
        .and_utc()
        .timestamp();

    let to_timestamp = to
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow!("Invalid to date"))?
        .and_utc()
        .timestamp();

    let url = format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
        ticker, from_timestamp, to_timestamp
    );

    let response = client
        .get(&url)
        .send()
        .await
        .context("Failed to send request to Yahoo Finance")?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Yahoo Finance returned error status: {}",
            response.status()
        ));
    }

    let data: YahooChartResponse = response
        .json()
        .await
        .context("Failed to parse Yahoo Finance response")?;

    if let Some(error) = data.chart.error {
        return Err(DashError::FetchError(format!(
            "{} - {}",
            error.code, error.description
        ))
        .into());
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("No data returned from Yahoo Finance"))?;

    let timestamps = result
        .timestamp
        .ok_or_else(|| anyhow!("No timestamp data"))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .ok_or_else(|| anyhow!("No close prices"))?;

    let mut observations: Vec<(NaiveDate, Option<Decimal>)> = Vec::new();
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow!("Invalid timestamp"))?
            .date_naive();

        // Intraday rows share the session date; keep the latest close.
        let close = closes
            .get(i)
            .copied()
            .flatten()
            .and_then(Decimal::from_f64_retain);
        match observations.last_mut() {
            Some((last_date, last_close)) if *last_date == date => {
                if close.is_some() {
                    *last_close = close;
                }
            }
            _ => observations.push((date, close)),
        }
    }

    debug!(
        "Fetched {} observations for {} ({} gaps)",
        observations.len(),
        ticker,
        observations.iter().filter(|(_, c)| c.is_none()).count()
    );
    Ok(observations)
}

/// Fetch fundamental metrics (NAV, AUM, P/E, P/B, yield) for one instrument.
///
/// Missing modules or fields degrade to absent metrics; only transport and
/// API-level failures are errors.
pub async fn fetch_fundamentals(ticker: &str) -> Result<Fundamentals> {
    info!("Fetching fundamentals for {} from Yahoo Finance", ticker);

    let client = build_client()?;
    let url = format!(
        "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=summaryDetail,defaultKeyStatistics",
        ticker
    );

    let response = client
        .get(&url)
        .send()
        .await
        .context("Failed to send request to Yahoo Finance")?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Yahoo Finance returned error status: {}",
            response.status()
        ));
    }

    let data: YahooSummaryResponse = response
        .json()
        .await
        .context("Failed to parse Yahoo Finance quoteSummary response")?;

    if let Some(error) = data.quote_summary.error {
        return Err(DashError::FetchError(format!(
            "{} - {}",
            error.code, error.description
        ))
        .into());
    }

    let result = data
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("No fundamentals returned from Yahoo Finance"))?;

    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.key_statistics.unwrap_or_default();

    Ok(Fundamentals {
        previous_close: RawValue::to_decimal(detail.previous_close),
        nav: RawValue::to_decimal(detail.nav_price),
        total_assets: RawValue::to_decimal(detail.total_assets),
        trailing_pe: RawValue::to_decimal(detail.trailing_pe),
        price_to_book: RawValue::to_decimal(stats.price_to_book),
        // Provider reports yield as a fraction; snapshot stores percent.
        dividend_yield: RawValue::to_decimal(detail.dividend_yield)
            .map(|y| y * Decimal::from(100)),
    })
}
