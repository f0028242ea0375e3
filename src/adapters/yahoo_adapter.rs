//! Yahoo Finance chart API adapter.
//!
//! Fetches daily bars per ticker from the v8 chart endpoint. A ticker the
//! service does not know is logged and skipped rather than failing the batch.

use crate::domain::error::AxiomError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::Period;
use crate::ports::market_data_port::MarketDataPort;
use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
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

/// Bars from one chart response body. Entries with any null field are dropped.
/// Returns `Ok(None)` when the service reports an error for the ticker.
pub fn parse_chart_response(
    ticker: &str,
    body: &str,
) -> Result<Option<Vec<OhlcvBar>>, AxiomError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| AxiomError::MarketData {
            reason: format!("invalid chart response for {ticker}: {e}"),
        })?;

    if let Some(error) = response.chart.error {
        warn!(
            ticker,
            code = %error.code,
            description = error.description.as_deref().unwrap_or(""),
            "chart API returned an error"
        );
        return Ok(None);
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Some(Vec::new()));
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(datetime) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
            at(&quote.volume, i),
        ) else {
            continue;
        };

        let bar = OhlcvBar {
            ticker: ticker.to_string(),
            date: datetime.date_naive(),
            open,
            high,
            low,
            close,
            volume: volume as i64,
        };
        if bar.is_complete() {
            bars.push(bar);
        }
    }

    Ok(Some(bars))
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, AxiomError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, AxiomError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("axiomquant/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AxiomError::MarketData {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn fetch_ticker(&self, ticker: &str, period: Period) -> Result<Vec<OhlcvBar>, AxiomError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let range = period.to_string();
        debug!(ticker, %range, "requesting chart data");

        let response = self
            .client
            .get(&url)
            .query(&[("range", range.as_str()), ("interval", "1d")])
            .send()
            .map_err(|e| AxiomError::MarketData {
                reason: format!("request for {ticker} failed: {e}"),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| AxiomError::MarketData {
            reason: format!("failed to read response for {ticker}: {e}"),
        })?;

        match parse_chart_response(ticker, &body) {
            Ok(bars) => Ok(bars.unwrap_or_default()),
            Err(_) if !status.is_success() => Err(AxiomError::MarketData {
                reason: format!("chart API returned {status} for {ticker}"),
            }),
            Err(e) => Err(e),
        }
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_market_data(
        &self,
        tickers: &[String],
        period: Period,
    ) -> Result<Vec<OhlcvBar>, AxiomError> {
        let mut all = Vec::new();
        for ticker in tickers {
            let bars = self.fetch_ticker(ticker, period)?;
            info!(ticker = %ticker, bars = bars.len(), "fetched market data");
            all.extend(bars);
        }
        Ok(all)
    }
}
