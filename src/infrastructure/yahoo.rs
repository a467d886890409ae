//! Daily history over the Yahoo-style chart API.
//!
//! The `/v8/finance/chart/{symbol}` endpoint returns aligned arrays of
//! timestamps and OHLCV/adjclose cells, with JSON `null` holes on halted or
//! unreported days. Holes are preserved as `None`; filling them is the
//! loader's job, not the transport's.

use crate::domain::ports::PriceHistorySource;
use crate::domain::series::{RawBar, Ticker};
use crate::infrastructure::http::{build_client, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::info;

pub struct YahooChartSource {
    client: ClientWithMiddleware,
    base_url: String,
}

impl YahooChartSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PriceHistorySource for YahooChartSource {
    async fn fetch_daily_history(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>> {
        // period2 is exclusive upstream; widen by a day to keep [start, end]
        // closed for callers.
        let period1 = unix_midnight(start).to_string();
        let period2 = unix_midnight(end + Duration::days(1)).to_string();

        let url = build_url_with_query(
            &format!("{}/v8/finance/chart/{}", self.base_url, ticker),
            &[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "div|split"),
            ],
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to fetch daily history for {ticker}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("chart API returned {status} for {ticker}: {body}");
        }

        let envelope: ChartEnvelope = response
            .json()
            .await
            .with_context(|| format!("failed to parse chart payload for {ticker}"))?;

        let bars = bars_from_chart(envelope)?;
        info!("{}: fetched {} raw bar(s) from chart API", ticker, bars.len());
        Ok(bars)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
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
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
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

#[derive(Debug, Default, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Flattens the chart envelope into raw bars, keeping null cells as `None`.
/// The per-column arrays can be ragged on bad days; a short column simply
/// reads as missing.
fn bars_from_chart(envelope: ChartEnvelope) -> Result<Vec<RawBar>> {
    if let Some(error) = envelope.chart.error {
        anyhow::bail!("chart API error: {error}");
    }
    let Some(result) = envelope
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
    else {
        return Ok(Vec::new());
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        bars.push(RawBar {
            date,
            open: cell(&quote.open, i),
            high: cell(&quote.high, i),
            low: cell(&quote.low, i),
            close: cell(&quote.close, i),
            adj_close: cell(&adjclose.adjclose, i),
            volume: cell(&quote.volume, i),
        });
    }
    Ok(bars)
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
