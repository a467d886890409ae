//! Z-score outlier detection over the daily return series.

use crate::domain::series::CleanedSeries;
use chrono::NaiveDate;
use statrs::statistics::{Data, Distribution};

/// Default |z| threshold above which a daily return is flagged.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// One flagged return.
#[derive(Debug, Clone, PartialEq)]
pub struct Outlier {
    /// Index into the cleaned series.
    pub index: usize,
    pub date: NaiveDate,
    pub daily_return: f64,
    pub z_score: f64,
}

/// Z-scores aligned with the series records plus the flagged subset.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    pub threshold: f64,
    pub z_scores: Vec<Option<f64>>,
    pub outliers: Vec<Outlier>,
}

impl OutlierReport {
    fn degenerate(threshold: f64, len: usize) -> Self {
        Self {
            threshold,
            z_scores: vec![None; len],
            outliers: Vec::new(),
        }
    }
}

/// Flags returns whose z-score magnitude strictly exceeds `threshold`.
///
/// Mean and standard deviation are taken once over the full return series,
/// not over a rolling window. A series whose returns have no spread cannot
/// rank anything as unusual, so it yields an empty report rather than an
/// error.
pub fn detect_outliers(series: &CleanedSeries, threshold: f64) -> OutlierReport {
    let len = series.len();
    let data = Data::new(series.daily_returns());
    let (Some(mean), Some(std_dev)) = (data.mean(), data.std_dev()) else {
        return OutlierReport::degenerate(threshold, len);
    };
    if std_dev == 0.0 || !std_dev.is_finite() {
        return OutlierReport::degenerate(threshold, len);
    }

    let mut z_scores = vec![None; len];
    let mut outliers = Vec::new();
    for (index, record) in series.records().iter().enumerate() {
        let Some(daily_return) = record.daily_return else {
            continue;
        };
        let z = (daily_return - mean) / std_dev;
        z_scores[index] = Some(z);
        if z.abs() > threshold {
            outliers.push(Outlier {
                index,
                date: record.date,
                daily_return,
                z_score: z,
            });
        }
    }
    OutlierReport {
        threshold,
        z_scores,
        outliers,
    }
}
