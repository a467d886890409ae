//! Descriptive statistics over the cleaned frame: an eight-number summary
//! per numeric column plus missing-value counts.

use crate::domain::analytics::stats;
use crate::domain::errors::AnalysisError;
use crate::domain::series::CleanedSeries;
use statrs::statistics::{Data, Distribution, Max, Min};

/// The numeric columns of a cleaned series, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
    DailyReturn,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 7] = [
        NumericColumn::Open,
        NumericColumn::High,
        NumericColumn::Low,
        NumericColumn::Close,
        NumericColumn::AdjClose,
        NumericColumn::Volume,
        NumericColumn::DailyReturn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Open => "open",
            NumericColumn::High => "high",
            NumericColumn::Low => "low",
            NumericColumn::Close => "close",
            NumericColumn::AdjClose => "adj_close",
            NumericColumn::Volume => "volume",
            NumericColumn::DailyReturn => "daily_return",
        }
    }

    /// The defined values of this column.
    pub fn values(self, series: &CleanedSeries) -> Vec<f64> {
        series
            .records()
            .iter()
            .filter_map(|r| match self {
                NumericColumn::Open => Some(r.open),
                NumericColumn::High => Some(r.high),
                NumericColumn::Low => Some(r.low),
                NumericColumn::Close => Some(r.close),
                NumericColumn::AdjClose => Some(r.adj_close),
                NumericColumn::Volume => Some(r.volume),
                NumericColumn::DailyReturn => r.daily_return,
            })
            .collect()
    }

    /// Cells still undefined after cleaning. Only the derived return column
    /// can be missing, and only on the first row.
    pub fn missing(self, series: &CleanedSeries) -> usize {
        match self {
            NumericColumn::DailyReturn => series
                .records()
                .iter()
                .filter(|r| r.daily_return.is_none())
                .count(),
            _ => 0,
        }
    }
}

/// Eight-number summary of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN for a single observation.
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// `None` for a column with no defined values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let data = Data::new(values.to_vec());
        let mean = data.mean()?;
        let std_dev = data.std_dev().unwrap_or(f64::NAN);
        Some(Self {
            count: values.len(),
            mean,
            std_dev,
            min: data.min(),
            q1: stats::quantile(values, 0.25)?,
            median: stats::quantile(values, 0.5)?,
            q3: stats::quantile(values, 0.75)?,
            max: data.max(),
        })
    }
}

/// One column's summary and missing count.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: NumericColumn,
    pub summary: ColumnSummary,
    pub missing: usize,
}

/// Summaries for every numeric column of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub columns: Vec<ColumnStats>,
}

/// Describes every numeric column, including the derived return column.
pub fn describe(series: &CleanedSeries) -> Result<DescriptiveStats, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::EmptySeries {
            ticker: series.ticker().to_string(),
            rows: 0,
            min: 1,
        });
    }
    let mut columns = Vec::with_capacity(NumericColumn::ALL.len());
    for column in NumericColumn::ALL {
        let values = column.values(series);
        let Some(summary) = ColumnSummary::from_values(&values) else {
            continue;
        };
        columns.push(ColumnStats {
            column,
            summary,
            missing: column.missing(series),
        });
    }
    Ok(DescriptiveStats { columns })
}
