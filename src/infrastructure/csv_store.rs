//! CSV snapshots of cleaned series.

use crate::domain::ports::SeriesStore;
use crate::domain::series::{CleanedSeries, Ticker, TimeSeriesRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::debug;

/// One row of the durable snapshot. The z-score column is a run-time cache
/// and not part of the persisted format.
#[derive(Debug, Serialize)]
struct SnapshotRow {
    index: usize,
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    adj_close: f64,
    volume: f64,
    daily_return: Option<f64>,
}

impl SnapshotRow {
    fn new(index: usize, record: &TimeSeriesRecord) -> Self {
        Self {
            index,
            date: record.date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            adj_close: record.adj_close,
            volume: record.volume,
            daily_return: record.daily_return,
        }
    }
}

/// Writes `<data_dir>/<TICKER>_processed_data.csv`, one file per ticker.
pub struct CsvSeriesStore {
    data_dir: PathBuf,
}

impl CsvSeriesStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, ticker: &Ticker) -> PathBuf {
        self.data_dir.join(format!("{ticker}_processed_data.csv"))
    }
}

impl SeriesStore for CsvSeriesStore {
    fn save(&self, series: &CleanedSeries) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        let path = self.path_for(series.ticker());

        // File::create truncates: every save is a full overwrite, re-running
        // the pipeline never appends.
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        for (index, record) in series.records().iter().enumerate() {
            writer
                .serialize(SnapshotRow::new(index, record))
                .with_context(|| format!("failed to serialize row {index}"))?;
        }
        writer.flush().context("failed to flush CSV writer")?;

        debug!("wrote {} rows to {}", series.len(), path.display());
        Ok(path)
    }
}
