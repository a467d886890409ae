//! Typed schema for one ticker's daily history.
//!
//! `RawBar` is what the retrieval collaborator hands over: dated rows whose
//! cells may be missing. `TimeSeriesRecord` is the cleaned shape the rest of
//! the pipeline consumes, where every price cell is populated and only the
//! structurally-undefined values (first-row return, uncomputed z-score) stay
//! optional.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Exchange symbol, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim().to_uppercase();
        if symbol.is_empty() {
            anyhow::bail!("ticker symbol must not be empty");
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'))
        {
            anyhow::bail!(
                "invalid ticker {:?}: only letters, digits, '.', '-' and '^' are allowed",
                s
            );
        }
        Ok(Ticker(symbol))
    }
}

/// One raw upstream row. Halted or unreported cells arrive as `None` and stay
/// that way until the loader's fill pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

/// One cleaned row. `daily_return` is `None` only on the first row of a
/// series; `z_score` is filled in once the outlier stage has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
    pub daily_return: Option<f64>,
    pub z_score: Option<f64>,
}

/// A ticker's cleaned, date-ordered history over a requested window.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSeries {
    ticker: Ticker,
    start: NaiveDate,
    end: NaiveDate,
    records: Vec<TimeSeriesRecord>,
}

impl CleanedSeries {
    /// Orders the records by date and drops duplicate dates, keeping the
    /// first occurrence.
    pub fn new(
        ticker: Ticker,
        start: NaiveDate,
        end: NaiveDate,
        mut records: Vec<TimeSeriesRecord>,
    ) -> Self {
        records.sort_by_key(|r| r.date);
        let before = records.len();
        records.dedup_by_key(|r| r.date);
        if records.len() < before {
            warn!(
                "{}: dropped {} duplicate-date record(s)",
                ticker,
                before - records.len()
            );
        }
        Self {
            ticker,
            start,
            end,
            records,
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The adjusted close column.
    pub fn adjusted_closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.adj_close).collect()
    }

    /// The defined daily returns, i.e. every row except the first.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.daily_return).collect()
    }

    /// Attaches the z-score column produced by the outlier stage. A column
    /// that does not line up with the records is refused.
    pub fn cache_z_scores(&mut self, scores: &[Option<f64>]) {
        if scores.len() != self.records.len() {
            warn!(
                "{}: z-score column has {} entries for {} records, not cached",
                self.ticker,
                scores.len(),
                self.records.len()
            );
            return;
        }
        for (record, z) in self.records.iter_mut().zip(scores) {
            record.z_score = *z;
        }
    }
}
