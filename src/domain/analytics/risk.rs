//! Tail-risk and volatility-scaled return metrics.

use crate::domain::analytics::stats;
use statrs::statistics::{Data, Distribution};

/// Value at Risk and the mean/volatility ratio for one return series.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMetrics {
    /// Confidence level the VaR was computed at, e.g. 0.99.
    pub confidence: f64,
    /// The `1 - confidence` return quantile. For any real price history this
    /// is negative: the loss not exceeded on `confidence` of days.
    pub value_at_risk: f64,
    /// Mean return divided by its sample standard deviation. NaN when the
    /// deviation is zero or undefined; the ratio has no meaning there.
    pub risk_adjusted_ratio: f64,
}

/// Return quantile at level `1 - confidence`, by linear interpolation
/// between order statistics. `None` for an empty series.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> Option<f64> {
    stats::quantile(returns, 1.0 - confidence)
}

/// Mean over sample standard deviation of the returns.
pub fn risk_adjusted_ratio(returns: &[f64]) -> f64 {
    let data = Data::new(returns.to_vec());
    match (data.mean(), data.std_dev()) {
        (Some(mean), Some(std_dev)) if std_dev > 0.0 => mean / std_dev,
        _ => f64::NAN,
    }
}

/// Both metrics over the defined return series.
pub fn risk_metrics(returns: &[f64], confidence: f64) -> Option<RiskMetrics> {
    let value_at_risk = value_at_risk(returns, confidence)?;
    Some(RiskMetrics {
        confidence,
        value_at_risk,
        risk_adjusted_ratio: risk_adjusted_ratio(returns),
    })
}
