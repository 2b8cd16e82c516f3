//! calibration::bounds — empirical box bounds for the groundwater scale `ω`.
//!
//! Purpose
//! -------
//! Bound `ω` so that the scaled mean surface `ω × mean` stays inside the
//! spread of groundwater levels actually observed across the seasonal
//! series. The envelope is taken on the log scale:
//!
//! - `env_low`  = `lower_q` quantile of `log(min layer)`  (default 5th pct),
//! - `env_high` = `upper_q` quantile of `log(max layer)`  (default 95th pct).
//!
//! For each grid candidate `ω` the same quantiles of `log(ω × mean layer)`
//! are computed. `ω_lo` is the candidate whose lower quantile is closest to
//! `env_low` without exceeding it; `ω_hi` is the candidate whose upper
//! quantile is closest to `env_high` without exceeding it.
//!
//! Key behaviors
//! -------------
//! - The grid is `start + step·k` for `k = 0..=⌊(stop − start)/step⌋`,
//!   evaluated in parallel with `rayon`; the probe trace keeps grid order.
//! - Failure to find either bound, or `ω_lo ≥ ω_hi`, is a configuration
//!   error carrying the full probe trace.
//! - Only finite, strictly positive cells enter the log quantiles.
//!
//! Testing notes
//! -------------
//! - A three-layer series with layers `0.6·b`, `b`, `1.4·b` must yield
//!   `ω_lo ≈ 0.6 < 1 < ω_hi ≈ 1.4`.
//! - Each unsatisfiable case (no lower bound, no upper bound, collapsed
//!   interval) fails with the full probe trace.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    calibration::{
        errors::{CalibError, CalibResult},
        quantile::quantile,
    },
    spatial::raster::{Raster, RasterSeries},
};

/// Candidate grid and envelope quantile levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmegaGrid {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    pub lower_q: f64,
    pub upper_q: f64,
}

impl Default for OmegaGrid {
    fn default() -> Self {
        OmegaGrid { start: 0.01, stop: 2.0, step: 0.01, lower_q: 0.05, upper_q: 0.95 }
    }
}

impl OmegaGrid {
    pub fn validate(&self) -> CalibResult<()> {
        let ok = self.start.is_finite()
            && self.stop.is_finite()
            && self.step.is_finite()
            && self.start > 0.0
            && self.step > 0.0
            && self.stop >= self.start;
        if !ok {
            return Err(CalibError::InvalidGrid { start: self.start, stop: self.stop, step: self.step });
        }
        if !(0.0..=1.0).contains(&self.lower_q) || !(0.0..=1.0).contains(&self.upper_q) {
            return Err(CalibError::InvalidConfig {
                field: "bounds.lower_q",
                reason: "envelope quantiles must lie in [0, 1]",
            });
        }
        Ok(())
    }

    /// Grid points, computed by multiplication to avoid accumulated drift.
    pub fn candidates(&self) -> Vec<f64> {
        let n = ((self.stop - self.start) / self.step + 1e-9).floor() as usize + 1;
        (0..n).map(|k| self.start + self.step * k as f64).collect()
    }
}

/// Log-scale quantiles of `ω × mean` for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundProbe {
    pub omega: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Resolved bounds with the envelope and the full probe trace.
#[derive(Debug, Clone, PartialEq)]
pub struct OmegaBounds {
    pub lower: f64,
    pub upper: f64,
    pub env_low: f64,
    pub env_high: f64,
    pub trace: Vec<BoundProbe>,
}

impl OmegaBounds {
    /// Strict containment `ω_lo < ω < ω_hi`.
    pub fn contains(&self, omega: f64) -> bool {
        omega > self.lower && omega < self.upper
    }
}

fn probe(mean: &Raster, omega: f64, grid: &OmegaGrid) -> CalibResult<BoundProbe> {
    let logs = mean.scaled(omega).log_values();
    Ok(BoundProbe {
        omega,
        lower: quantile(&logs, grid.lower_q, "log scaled mean layer")?,
        upper: quantile(&logs, grid.upper_q, "log scaled mean layer")?,
    })
}

/// First probe (in grid order) maximizing `key` among those with
/// `key <= limit`.
fn closest_below<F: Fn(&BoundProbe) -> f64>(trace: &[BoundProbe], limit: f64, key: F) -> Option<f64> {
    let mut best: Option<&BoundProbe> = None;
    for p in trace.iter().filter(|p| key(p) <= limit) {
        if best.map_or(true, |b| key(p) > key(b)) {
            best = Some(p);
        }
    }
    best.map(|p| p.omega)
}

/// Solve `(ω_lo, ω_hi)` for `series` over `grid`.
///
/// Errors
/// ------
/// - `CalibError::InvalidGrid` / `CalibError::InvalidConfig` for a malformed
///   grid.
/// - `CalibError::EmptySample` when a reduced layer has no positive cells.
/// - `CalibError::BoundsUnsatisfiable` when a bound cannot be found or the
///   bounds do not form an interval.
pub fn solve_omega_bounds(series: &RasterSeries, grid: &OmegaGrid) -> CalibResult<OmegaBounds> {
    grid.validate()?;
    let env_low = quantile(&series.cell_min().log_values(), grid.lower_q, "log minimum layer")?;
    let env_high = quantile(&series.cell_max().log_values(), grid.upper_q, "log maximum layer")?;
    let mean = series.cell_mean();

    let trace: Vec<BoundProbe> = grid
        .candidates()
        .par_iter()
        .map(|&omega| probe(&mean, omega, grid))
        .collect::<CalibResult<Vec<_>>>()?;

    let lower = closest_below(&trace, env_low, |p| p.lower);
    let upper = closest_below(&trace, env_high, |p| p.upper);
    let (lower, upper) = match (lower, upper) {
        (None, _) => {
            return Err(CalibError::BoundsUnsatisfiable {
                reason: "no candidate keeps the lower quantile at or below the minimum envelope",
                trace,
            });
        }
        (_, None) => {
            return Err(CalibError::BoundsUnsatisfiable {
                reason: "no candidate keeps the upper quantile at or below the maximum envelope",
                trace,
            });
        }
        (Some(lo), Some(hi)) if lo >= hi => {
            return Err(CalibError::BoundsUnsatisfiable {
                reason: "lower omega bound is not below the upper bound",
                trace,
            });
        }
        (Some(lo), Some(hi)) => (lo, hi),
    };
    log::info!(
        "omega bounds: ({lower:.2}, {upper:.2}) from envelope [{env_low:.4}, {env_high:.4}] over {} candidates",
        trace.len()
    );
    Ok(OmegaBounds { lower, upper, env_low, env_high, trace })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{crs::Crs, raster::GridSpec};
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Grid construction.
    // - The bracketing scenario ω_lo < 1 < ω_hi.
    // - Unsatisfiable grids carrying the probe trace.
    // -------------------------------------------------------------------------

    fn series(factors: &[f64]) -> RasterSeries {
        let spec = GridSpec::new(Crs::CA_ALBERS, 0.0, 10.0, 1.0).unwrap();
        let base = Array2::from_shape_fn((10, 10), |(r, c)| 10.0 + (r * 10 + c) as f64);
        let layers = factors.iter().map(|f| Raster::new(spec, base.mapv(|v| v * f)).unwrap()).collect();
        RasterSeries::new(layers).unwrap()
    }

    #[test]
    fn default_grid_has_two_hundred_candidates() {
        let c = OmegaGrid::default().candidates();

        assert_eq!(c.len(), 200);
        assert_abs_diff_eq!(c[0], 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(c[199], 2.0, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // The bounds bracket the unscaled mean surface.
    //
    // Given
    // -----
    // - Layers 0.6·b, b, 1.4·b so min = 0.6·b, mean = b, max = 1.4·b.
    //
    // Expect
    // ------
    // - ω_lo ≈ 0.6 and ω_hi ≈ 1.4 (within one grid step), hence
    //   ω_lo < 1 < ω_hi.
    fn bounds_bracket_unit_scale() {
        let bounds = solve_omega_bounds(&series(&[0.6, 1.0, 1.4]), &OmegaGrid::default()).unwrap();

        assert!(bounds.lower < 1.0 && 1.0 < bounds.upper);
        assert_abs_diff_eq!(bounds.lower, 0.6, epsilon = 0.011);
        assert_abs_diff_eq!(bounds.upper, 1.4, epsilon = 0.011);
        assert!(bounds.contains(1.0));
        assert!(!bounds.contains(bounds.lower));
        assert_eq!(bounds.trace.len(), 200);
        assert!(bounds.trace.windows(2).all(|w| w[0].omega < w[1].omega));
    }

    #[test]
    // Purpose
    // -------
    // A grid that starts above every feasible lower bound fails with the full
    // probe trace attached.
    fn unsatisfiable_grid_reports_trace() {
        let grid = OmegaGrid { start: 1.5, stop: 2.0, ..OmegaGrid::default() };

        let err = solve_omega_bounds(&series(&[0.6, 1.0, 1.4]), &grid).unwrap_err();

        match err {
            CalibError::BoundsUnsatisfiable { reason, trace } => {
                assert_eq!(
                    reason,
                    "no candidate keeps the lower quantile at or below the minimum envelope"
                );
                assert_eq!(trace.len(), 51);
                assert_abs_diff_eq!(trace[0].omega, 1.5, epsilon = 1e-12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A series without seasonal spread collapses both bounds onto the same
    // candidate, which is not an interval.
    //
    // Given
    // -----
    // - A single layer, so min = mean = max.
    // - Grid 0.5, 0.6, ..., 0.9, all below 1.
    //
    // Expect
    // ------
    // - Both bounds select 0.9, so the error reports the inverted interval.
    // - The trace holds all five probes in grid order, each offset from the
    //   first by `ln(ω / 0.5)`.
    fn collapsed_bounds_report_trace() {
        let grid = OmegaGrid { start: 0.5, stop: 0.9, step: 0.1, ..OmegaGrid::default() };

        let err = solve_omega_bounds(&series(&[1.0]), &grid).unwrap_err();

        match err {
            CalibError::BoundsUnsatisfiable { reason, trace } => {
                assert_eq!(reason, "lower omega bound is not below the upper bound");
                assert_eq!(trace.len(), 5);
                assert_abs_diff_eq!(trace[4].omega, 0.9, epsilon = 1e-12);
                for p in &trace {
                    let shift = (p.omega / 0.5).ln();
                    assert_abs_diff_eq!(p.lower - trace[0].lower, shift, epsilon = 1e-9);
                    assert_abs_diff_eq!(p.upper - trace[0].upper, shift, epsilon = 1e-9);
                }
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // The upper bound can fail on its own when the maximum layer has
    // positive cells whose mean is not positive.
    //
    // Given
    // -----
    // - Two cells, layers [10, -100] and [10, 1]: the second cell enters the
    //   log maximum layer (ln 1 = 0) but not the log mean layer.
    // - env_high = 0.95 · ln 10 ≈ 2.187, so the upper side needs ω ≤ 0.891,
    //   while the lower side needs ω ≤ 1.
    // - Grid 0.95, 0.96, ..., 1.0.
    //
    // Expect
    // ------
    // - The upper-side error, with six probes whose upper quantile is
    //   `ln(10 ω)`.
    fn missing_upper_bound_reports_trace() {
        let spec = GridSpec::new(Crs::CA_ALBERS, 0.0, 1.0, 1.0).unwrap();
        let layers = vec![
            Raster::new(spec, ndarray::array![[10.0, -100.0]]).unwrap(),
            Raster::new(spec, ndarray::array![[10.0, 1.0]]).unwrap(),
        ];
        let grid = OmegaGrid { start: 0.95, stop: 1.0, ..OmegaGrid::default() };

        let err = solve_omega_bounds(&RasterSeries::new(layers).unwrap(), &grid).unwrap_err();

        match err {
            CalibError::BoundsUnsatisfiable { reason, trace } => {
                assert_eq!(
                    reason,
                    "no candidate keeps the upper quantile at or below the maximum envelope"
                );
                assert_eq!(trace.len(), 6);
                for p in &trace {
                    assert_abs_diff_eq!(p.upper, (10.0 * p.omega).ln(), epsilon = 1e-12);
                    assert!(p.upper > 0.95 * 10f64.ln());
                }
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn grid_validate_rejects_bad_values() {
        let bad = OmegaGrid { step: 0.0, ..OmegaGrid::default() };

        assert!(matches!(bad.validate(), Err(CalibError::InvalidGrid { .. })));
    }
}
