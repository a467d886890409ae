//! Port interfaces for the collaborators the pipeline depends on.

use crate::domain::series::{CleanedSeries, RawBar, Ticker};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Remote daily price history. Implementations own their transport concerns
/// (retry, timeouts); callers only see the final outcome.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Fetches raw daily bars for `ticker` over the closed range
    /// `[start, end]`. Rows may arrive unordered and cells may be missing.
    async fn fetch_daily_history(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>>;
}

/// Durable storage for cleaned series snapshots.
pub trait SeriesStore: Send + Sync {
    /// Writes the full series, replacing any previous snapshot for the same
    /// ticker, and returns the path written.
    fn save(&self, series: &CleanedSeries) -> Result<PathBuf>;
}

/// A labeled polyline in chart coordinates. The x axis is epoch days for
/// dated series and the lag number for correlation charts.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

/// One figure: title and axis names plus any number of labeled series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<LabeledSeries>,
}

/// Display backend for the chart catalog. The interactive viewer and the
/// text renderer both sit behind this seam.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartSpec) -> Result<()>;
}
