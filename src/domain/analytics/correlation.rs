//! Serial-dependence diagnostics: autocorrelation as the Pearson correlation
//! of the series against its own lagged copy, and partial autocorrelation via
//! the Durbin-Levinson recursion over those same coefficients.

use crate::domain::analytics::stats;
use crate::domain::errors::AnalysisError;

/// Denominators smaller than this are treated as no variance.
const VARIANCE_FLOOR: f64 = 1e-10;

/// ACF and PACF over lags `1..=max_lag`. Index 0 holds lag 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationDiagnostics {
    pub max_lag: usize,
    pub acf: Vec<f64>,
    pub pacf: Vec<f64>,
}

/// Pearson correlation of the series with itself shifted by each lag in
/// `1..=max_lag`. Needs strictly more observations than lags so even the
/// deepest shift leaves a pair to correlate.
pub fn autocorrelation(values: &[f64], max_lag: usize) -> Result<Vec<f64>, AnalysisError> {
    let n = values.len();
    if n <= max_lag {
        return Err(AnalysisError::InsufficientHistory {
            operation: "autocorrelation",
            required: max_lag + 1,
            actual: n,
        });
    }
    Ok((1..=max_lag)
        .map(|lag| pearson(&values[..n - lag], &values[lag..]))
        .collect())
}

/// Partial autocorrelation over lags `1..=max_lag`, derived from the same
/// coefficients `autocorrelation` reports.
pub fn partial_autocorrelation(values: &[f64], max_lag: usize) -> Result<Vec<f64>, AnalysisError> {
    let acf = autocorrelation(values, max_lag)?;
    Ok(durbin_levinson(&acf))
}

/// Both diagnostics in one pass over the data.
pub fn diagnostics(
    values: &[f64],
    max_lag: usize,
) -> Result<CorrelationDiagnostics, AnalysisError> {
    let acf = autocorrelation(values, max_lag)?;
    let pacf = durbin_levinson(&acf);
    Ok(CorrelationDiagnostics { max_lag, acf, pacf })
}

/// Pearson correlation of two equal-length slices. A degenerate side (no
/// variance) reports zero correlation.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let (Some(mean_x), Some(mean_y)) = (stats::mean(x), stats::mean(y)) else {
        return 0.0;
    };
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom < VARIANCE_FLOOR {
        return 0.0;
    }
    cov / denom
}

/// Durbin-Levinson recursion: reads reflection coefficients off the
/// autocorrelations, lag by lag. `acf[k - 1]` holds rho(k); rho(0) is one by
/// definition.
fn durbin_levinson(acf: &[f64]) -> Vec<f64> {
    let rho = |k: usize| if k == 0 { 1.0 } else { acf[k - 1] };
    let mut pacf = Vec::with_capacity(acf.len());
    let mut phi_prev: Vec<f64> = Vec::new();

    for k in 1..=acf.len() {
        let mut num = rho(k);
        let mut den = 1.0;
        for j in 1..k {
            num -= phi_prev[j - 1] * rho(k - j);
            den -= phi_prev[j - 1] * rho(j);
        }
        let phi_kk = if den.abs() < VARIANCE_FLOOR {
            0.0
        } else {
            num / den
        };

        let mut phi_curr = Vec::with_capacity(k);
        for j in 1..k {
            phi_curr.push(phi_prev[j - 1] - phi_kk * phi_prev[k - 1 - j]);
        }
        phi_curr.push(phi_kk);

        pacf.push(phi_kk);
        phi_prev = phi_curr;
    }
    pacf
}
