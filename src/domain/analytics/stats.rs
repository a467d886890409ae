//! Scalar statistics shared by the analytics stages.

use std::cmp::Ordering;

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). `None` with fewer than two
/// values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Quantile by linear interpolation between adjacent order statistics: the
/// value at fractional rank `tau * (n - 1)` of the sorted sample. `tau` is
/// clamped to `[0, 1]`; an empty slice has no quantiles.
pub fn quantile(values: &[f64], tau: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let tau = tau.clamp(0.0, 1.0);
    let pos = tau * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    if frac == 0.0 || lo + 1 >= sorted.len() {
        return Some(sorted[lo]);
    }
    Some(sorted[lo] + frac * (sorted[lo + 1] - sorted[lo]))
}
