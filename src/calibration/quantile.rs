//! Empirical quantiles by linear interpolation between order statistics.
//!
//! Position `h = q·(n − 1)` on the sorted sample; the result interpolates
//! between `x[⌊h⌋]` and `x[⌈h⌉]`.

use crate::calibration::errors::{CalibError, CalibResult};

/// Quantile `q ∈ [0, 1]` of `values`.
///
/// Errors
/// ------
/// - `CalibError::InvalidQuantile` when `q` is outside `[0, 1]` or NaN.
/// - `CalibError::EmptySample` when `values` is empty.
pub fn quantile(values: &[f64], q: f64, context: &'static str) -> CalibResult<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(CalibError::InvalidQuantile { q });
    }
    if values.is_empty() {
        return Err(CalibError::EmptySample { context });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(quantile_sorted(&sorted, q))
}

/// Quantile of an already sorted, non-empty sample.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * ((sorted.len() - 1) as f64);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - (lo as f64);
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let v = [4.0, 1.0, 3.0, 2.0];

        assert_abs_diff_eq!(quantile(&v, 0.25, "t").unwrap(), 1.75, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile(&v, 0.5, "t").unwrap(), 2.5, epsilon = 1e-12);
        assert_eq!(quantile(&v, 0.0, "t").unwrap(), 1.0);
        assert_eq!(quantile(&v, 1.0, "t").unwrap(), 4.0);
        assert_eq!(quantile(&[7.0], 0.3, "t").unwrap(), 7.0);
    }

    #[test]
    fn quantile_rejects_bad_level_and_empty_sample() {
        assert_eq!(quantile(&[1.0], 1.5, "t").unwrap_err(), CalibError::InvalidQuantile { q: 1.5 });
        assert_eq!(quantile(&[], 0.5, "t").unwrap_err(), CalibError::EmptySample { context: "t" });
    }
}
