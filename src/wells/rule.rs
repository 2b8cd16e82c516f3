//! wells::rule — the well-failure decision rule and its model variants.
//!
//! Purpose
//! -------
//! Decide, for one well and one parameter vector `(d, ω)`, whether the well
//! goes dry. Calibration and prediction both call [`WellFailureRule`], so the
//! rule is evaluated identically in both places.
//!
//! Key behaviors
//! -------------
//! - Wells completed before the active cutoff year (or without a year) are
//!   excluded from evaluation: neither dry nor wet.
//! - Pump location `pl = d × wch`, measured below land surface, where
//!   `wch` is the screened-interval bottom depth.
//! - Groundwater estimate `gw = ω × g`, where `g` is the well's sample of the
//!   cross-layer mean raster.
//! - `dry ⇔ gw ≥ pl`.
//! - [`ModelVariant`] maps a free-parameter vector `θ` onto `(d, ω)`:
//!   null (no free parameters, pump at the screened bottom, `ω = 1`),
//!   single-parameter (`θ = [d]`, `ω = 1`), double-parameter (`θ = [d, ω]`).
//!
//! Invariants & assumptions
//! ------------------------
//! - The rule is pure and `Sync`; concurrent evaluation needs no locking.
//! - For fixed `ω`, the number of dry wells is non-increasing in `d`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the null and single-parameter scenarios on a 10-well unit,
//!   retirement exclusion, monotonicity in `d`, and variant mapping.

use serde::{Deserialize, Serialize};

use crate::wells::{
    errors::{WellError, WellResult},
    population::SampledWells,
};

/// Pump-position fraction `d` and groundwater scale `ω`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpParams {
    pub d: f64,
    pub omega: f64,
}

impl PumpParams {
    /// Errors
    /// ------
    /// - `WellError::InvalidPumpFraction` unless `d` is finite and in `[0, 1]`.
    /// - `WellError::InvalidScale` unless `omega` is finite and `> 0`.
    pub fn new(d: f64, omega: f64) -> WellResult<Self> {
        if !d.is_finite() || !(0.0..=1.0).contains(&d) {
            return Err(WellError::InvalidPumpFraction { value: d });
        }
        if !omega.is_finite() || omega <= 0.0 {
            return Err(WellError::InvalidScale { value: omega });
        }
        Ok(PumpParams { d, omega })
    }
}

/// The three calibrated model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Pump at the screened-interval bottom, unscaled mean raster: reported
    /// as `PumpParams { d: 1.0, omega: 1.0 }`, so a well is dry exactly when
    /// `g ≥ wch`.
    Null,
    /// Calibrate `d`; `ω = 1`.
    SingleParameter,
    /// Calibrate `d` and `ω`.
    DoubleParameter,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 3] =
        [ModelVariant::Null, ModelVariant::SingleParameter, ModelVariant::DoubleParameter];

    /// Number of free parameters in `θ`.
    pub fn n_free(&self) -> usize {
        match self {
            ModelVariant::Null => 0,
            ModelVariant::SingleParameter => 1,
            ModelVariant::DoubleParameter => 2,
        }
    }

    /// Map a free-parameter vector onto `(d, ω)`.
    ///
    /// No range checks are performed here so the optimizer can probe
    /// infeasible candidates; feasibility is judged by the objective.
    ///
    /// Errors
    /// ------
    /// - `WellError::ThetaLengthMismatch` when `theta.len() != self.n_free()`.
    pub fn params(&self, theta: &[f64]) -> WellResult<PumpParams> {
        if theta.len() != self.n_free() {
            return Err(WellError::ThetaLengthMismatch {
                expected: self.n_free(),
                actual: theta.len(),
            });
        }
        Ok(match self {
            ModelVariant::Null => PumpParams { d: 1.0, omega: 1.0 },
            ModelVariant::SingleParameter => PumpParams { d: theta[0], omega: 1.0 },
            ModelVariant::DoubleParameter => PumpParams { d: theta[0], omega: theta[1] },
        })
    }

    /// Free-parameter vector for `params` (inverse of [`ModelVariant::params`]).
    pub fn theta(&self, params: PumpParams) -> Vec<f64> {
        match self {
            ModelVariant::Null => vec![],
            ModelVariant::SingleParameter => vec![params.d],
            ModelVariant::DoubleParameter => vec![params.d, params.omega],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelVariant::Null => "null",
            ModelVariant::SingleParameter => "single-parameter",
            ModelVariant::DoubleParameter => "double-parameter",
        }
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Active cutoff year: wells older than `reference_year − retirement_age` are
/// presumed retired.
pub fn active_cutoff_year(reference_year: i32, retirement_age: i32) -> i32 {
    reference_year - retirement_age
}

/// Dry/not-dry decision for individual wells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellFailureRule {
    pub cutoff_year: i32,
}

impl WellFailureRule {
    pub fn new(cutoff_year: i32) -> Self {
        WellFailureRule { cutoff_year }
    }

    /// Pump depth below land surface for a water column of height `wch`.
    pub fn pump_location(wch: f64, d: f64) -> f64 {
        d * wch
    }

    /// Evaluate one well.
    ///
    /// Returns `None` when the well is excluded (no year, or completed before
    /// the cutoff); otherwise `Some(dry)`.
    pub fn evaluate(
        &self, year: Option<i32>, screened_bottom: f64, gw_mean: f64, params: PumpParams,
    ) -> Option<bool> {
        if !year.is_some_and(|y| y >= self.cutoff_year) {
            return None;
        }
        let pl = Self::pump_location(screened_bottom, params.d);
        let gw = params.omega * gw_mean;
        Some(gw >= pl)
    }

    /// Evaluate every well of a sampled view, in view order.
    pub fn evaluate_all(&self, wells: &SampledWells<'_>, params: PumpParams) -> Vec<Option<bool>> {
        wells
            .gw_mean()
            .iter()
            .enumerate()
            .map(|(k, &g)| {
                let w = wells.well(k);
                self.evaluate(w.year, w.screened_bottom, g, params)
            })
            .collect()
    }
}
