// =============================================================================
// Yahoo Finance chart client: daily OHLCV history
// =============================================================================
//
// Fetches `{base_url}/{symbol}?range=..&interval=..` and turns the columnar
// chart payload into `Bar`s.  Rows whose close is null or NaN are dropped.
// No retries: a failed ticker is the caller's to skip.
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::bar::{retain_valid, Bar};

/// Public chart endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Parse a chart JSON body into time-ordered bars with a finite close.
pub fn parse_chart(body: &str) -> Result<Vec<Bar>> {
    let resp: ChartResponse =
        serde_json::from_str(body).context("failed to parse chart response")?;

    if let Some(err) = resp.chart.error {
        return Err(anyhow!("chart error {}: {}", err.code, err.description));
    }

    let result = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("chart response has no result"))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let col = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = col(&quote.close[..], i)?;
            Some(Bar {
                timestamp: ts,
                open: col(&quote.open[..], i),
                high: col(&quote.high[..], i),
                low: col(&quote.low[..], i),
                close,
                volume: col(&quote.volume[..], i),
            })
        })
        .collect();

    Ok(retain_valid(bars))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Thin HTTP client for the chart endpoint.
#[derive(Clone)]
pub struct ChartClient {
    base_url: String,
    range: String,
    interval: String,
    client: reqwest::Client,
}

impl ChartClient {
    /// Create a client for `base_url` requesting `range` of `interval` bars
    /// (e.g. `"1y"` of `"1d"`).
    pub fn new(
        base_url: impl Into<String>,
        range: impl Into<String>,
        interval: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("setup-scanner/1.0")
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            range: range.into(),
            interval: interval.into(),
            client,
        })
    }

    /// Fetch the daily history for `symbol`.
    #[instrument(skip(self), fields(range = %self.range, interval = %self.interval))]
    pub async fn fetch_history(&self, symbol: &str) -> Result<Vec<Bar>> {
        let url = format!("{}/{}", self.base_url, symbol);
        let body = self
            .client
            .get(&url)
            .query(&[("range", self.range.as_str()), ("interval", self.interval.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?
            .text()
            .await
            .context("failed to read chart response body")?;

        let bars = parse_chart(&body).with_context(|| format!("bad chart payload for {symbol}"))?;
        debug!(symbol, bars = bars.len(), "history fetched");
        Ok(bars)
    }
}
