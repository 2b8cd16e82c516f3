//! calibration::objective — sum-of-squared-error scoring of the rule.
//!
//! Purpose
//! -------
//! Score a parameter vector by how well the predicted per-unit failure
//! ratios reproduce the observed ratios of the calibration targets, and
//! expose that score to the optimizer as an [`Objective`].
//!
//! Key behaviors
//! -------------
//! - [`sse`] takes `observed` first and `predicted` second and skips pairs
//!   where either side is undefined (non-finite).
//! - [`CalibrationProblem`] reuses one fine-tessellation [`UnitAssignment`]
//!   for every evaluation, so dry and wet counts always partition the same
//!   well set.
//! - Infeasible candidates (`d ∉ (0, 1)`, or `ω ∉ (ω_lo, ω_hi)` for the
//!   double-parameter model) cost `+inf`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The problem borrows all inputs immutably; evaluation is pure and
//!   `Sync`.
//! - `assignment` was built from `wells.locations()`, so point `k` of the
//!   assignment is well `k` of the sampled view.

use crate::{
    calibration::{
        bias_filter::CalibrationTargetSet,
        bounds::OmegaBounds,
        errors::{CalibError, CalibResult},
    },
    optimization::{
        errors::{OptError, OptResult},
        simplex_optimizer::{Cost, Objective, Theta},
    },
    spatial::aggregate::UnitAssignment,
    wells::{
        population::SampledWells,
        rule::{ModelVariant, PumpParams, WellFailureRule},
    },
};

/// `Σ (predicted_i − observed_i)²` over pairs where both values are finite.
///
/// Errors
/// ------
/// - `CalibError::LengthMismatch` when the slices differ in length.
pub fn sse(observed: &[f64], predicted: &[f64]) -> CalibResult<f64> {
    if observed.len() != predicted.len() {
        return Err(CalibError::LengthMismatch { observed: observed.len(), predicted: predicted.len() });
    }
    Ok(observed
        .iter()
        .zip(predicted)
        .filter(|(o, p)| o.is_finite() && p.is_finite())
        .map(|(o, p)| (p - o).powi(2))
        .sum())
}

/// Per-unit dry and evaluated-active counts for one parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCounts {
    pub dry: Vec<u64>,
    pub active: Vec<u64>,
}

/// Apply `rule` to every well and aggregate with a fixed assignment.
pub fn count_with_rule(
    wells: &SampledWells<'_>, assignment: &UnitAssignment, rule: WellFailureRule,
    params: PumpParams,
) -> RuleCounts {
    let flags = rule.evaluate_all(wells, params);
    RuleCounts {
        dry: assignment.counts_where(|k| flags[k] == Some(true)),
        active: assignment.counts_where(|k| flags[k].is_some()),
    }
}

/// SSE problem over the calibration targets for one model variant.
#[derive(Debug, Clone)]
pub struct CalibrationProblem<'a> {
    wells: &'a SampledWells<'a>,
    assignment: &'a UnitAssignment,
    targets: &'a CalibrationTargetSet,
    rule: WellFailureRule,
    variant: ModelVariant,
    omega_range: (f64, f64),
    observed: Vec<f64>,
}

impl<'a> CalibrationProblem<'a> {
    pub fn new(
        wells: &'a SampledWells<'a>, assignment: &'a UnitAssignment,
        targets: &'a CalibrationTargetSet, rule: WellFailureRule, variant: ModelVariant,
        bounds: &OmegaBounds,
    ) -> Self {
        CalibrationProblem {
            wells,
            assignment,
            targets,
            rule,
            variant,
            omega_range: (bounds.lower, bounds.upper),
            observed: targets.observed(),
        }
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    /// Open-interval feasibility of `params` for this variant.
    pub fn is_feasible(&self, params: PumpParams) -> bool {
        let d_ok = params.d > 0.0 && params.d < 1.0;
        match self.variant {
            ModelVariant::Null => true,
            ModelVariant::SingleParameter => d_ok,
            ModelVariant::DoubleParameter => {
                d_ok && params.omega > self.omega_range.0 && params.omega < self.omega_range.1
            }
        }
    }

    /// Predicted ratio per target, NaN where no evaluated well falls in the unit.
    pub fn predicted_ratios(&self, params: PumpParams) -> Vec<f64> {
        let counts = count_with_rule(self.wells, self.assignment, self.rule, params);
        self.targets
            .targets()
            .iter()
            .map(|t| match counts.active[t.unit] {
                0 => f64::NAN,
                n => counts.dry[t.unit] as f64 / n as f64,
            })
            .collect()
    }

    /// SSE at `params`, ignoring feasibility.
    pub fn sse_at(&self, params: PumpParams) -> CalibResult<f64> {
        sse(&self.observed, &self.predicted_ratios(params))
    }
}

impl Objective for CalibrationProblem<'_> {
    fn cost(&self, theta: &Theta) -> OptResult<Cost> {
        let params = self.variant.params(&theta.to_vec())?;
        if !self.is_feasible(params) {
            return Ok(f64::INFINITY);
        }
        self.sse_at(params).map_err(|e| OptError::ObjectiveFailed { text: e.to_string() })
    }

    fn check(&self, theta: &Theta) -> OptResult<()> {
        self.variant.params(&theta.to_vec())?;
        Ok(())
    }
}
