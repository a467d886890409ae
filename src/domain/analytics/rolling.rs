//! Trailing-window statistics over the adjusted close.

use crate::domain::analytics::stats;

/// Rolling mean and sample standard deviation, index-aligned with the input.
/// The first `window - 1` positions are undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    pub window: usize,
    pub mean: Vec<Option<f64>>,
    pub std_dev: Vec<Option<f64>>,
}

/// Computes trailing-window statistics. A window of zero, or one longer than
/// the series, leaves every position undefined rather than failing: callers
/// that plot the overlay simply get an empty line.
pub fn rolling_stats(values: &[f64], window: usize) -> RollingStats {
    let n = values.len();
    let mut mean = vec![None; n];
    let mut std_dev = vec![None; n];
    if window == 0 || window > n {
        return RollingStats {
            window,
            mean,
            std_dev,
        };
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        mean[i] = stats::mean(slice);
        std_dev[i] = stats::sample_std(slice);
    }
    RollingStats {
        window,
        mean,
        std_dev,
    }
}
