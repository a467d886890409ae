//! Classical multiplicative decomposition of a regularly-sampled series into
//! trend, seasonal and residual parts.
//!
//! The trend is a centered moving average over one period; for even periods
//! the window spans `period + 1` points with the two edge points half
//! weighted. The seasonal component is the per-position mean of the detrended
//! series, normalized so the factors average to one, then tiled across the
//! full length. Trend and residual are undefined for the first and last
//! `period / 2` positions, where the smoothing window does not fit.

use crate::domain::analytics::stats;
use crate::domain::errors::AnalysisError;

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalDecomposition {
    pub period: usize,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

impl SeasonalDecomposition {
    /// Positions at each edge where trend and residual are undefined.
    pub fn edge_width(&self) -> usize {
        self.period / 2
    }
}

/// Splits `values` into trend, seasonal and residual components under a
/// multiplicative model: `value = trend * seasonal * residual`.
///
/// Requires at least two full cycles, so every seasonal position is observed
/// with a defined trend at least once.
pub fn decompose_multiplicative(
    values: &[f64],
    period: usize,
) -> Result<SeasonalDecomposition, AnalysisError> {
    let n = values.len();
    if period < 2 || n < 2 * period {
        return Err(AnalysisError::InsufficientHistory {
            operation: "seasonal decomposition",
            required: (2 * period).max(4),
            actual: n,
        });
    }

    let trend = centered_trend(values, period);

    let mut detrended: Vec<Option<f64>> = vec![None; n];
    for i in 0..n {
        if let Some(t) = trend[i]
            && t != 0.0
        {
            detrended[i] = Some(values[i] / t);
        }
    }

    // Per-position means of the detrended series, normalized to average one
    // so the seasonal component carries no net level.
    let mut factors = vec![1.0; period];
    for (pos, factor) in factors.iter_mut().enumerate() {
        let position_values: Vec<f64> = detrended
            .iter()
            .skip(pos)
            .step_by(period)
            .flatten()
            .copied()
            .collect();
        if let Some(mean) = stats::mean(&position_values) {
            *factor = mean;
        }
    }
    if let Some(factor_mean) = stats::mean(&factors)
        && factor_mean != 0.0
    {
        for factor in factors.iter_mut() {
            *factor /= factor_mean;
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| factors[i % period]).collect();

    let mut residual: Vec<Option<f64>> = vec![None; n];
    for i in 0..n {
        if let Some(t) = trend[i] {
            let denom = t * seasonal[i];
            if denom != 0.0 {
                residual[i] = Some(values[i] / denom);
            }
        }
    }

    Ok(SeasonalDecomposition {
        period,
        trend,
        seasonal,
        residual,
    })
}

/// Centered moving average of one period, `None` where the window does not
/// fit. Even periods use a `period + 1` window with half-weighted ends so the
/// average stays centered on the sample.
fn centered_trend(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![None; n];
    for i in half..(n - half) {
        let window = &values[i - half..=i + half];
        let sum = if period % 2 == 0 {
            let interior: f64 = window[1..window.len() - 1].iter().sum();
            interior + 0.5 * (window[0] + window[window.len() - 1])
        } else {
            window.iter().sum()
        };
        trend[i] = Some(sum / period as f64);
    }
    trend
}
