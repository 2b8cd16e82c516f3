//! Public API surface for bounded derivative-free minimization.
//!
//! - [`Objective`]: trait users implement for their problem.
//! - [`SearchOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`OptimOutcome`]: normalized result returned by `minimize`.
//!
//! Convention: we *minimize* a cost `c(θ)`. Constraints are expressed as a
//! penalty: an infeasible `θ` must evaluate to `+inf`, never to an error and
//! never to NaN.
use std::time::Duration;

use crate::optimization::{
    errors::{OptError, OptResult},
    simplex_optimizer::{
        types::{Cost, DEFAULT_RELATIVE_STEP, FnEvalMap, Theta},
        validation::{
            validate_theta_hat, validate_value, verify_initial_step, verify_max_iter,
            verify_tol_sd,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};

/// User-implemented objective.
///
/// Required:
/// - `cost(&Theta) -> OptResult<Cost>`: evaluate `c(θ)`. Return `+inf` for
///   infeasible candidates; errors are reserved for malformed inputs.
/// - `check(&Theta) -> OptResult<()>`: validation hook to reject obviously
///   invalid starting points. Called once per start before optimization.
///
/// Implementations must be pure: the same `θ` yields the same cost. `Sync`
/// lets multi-start share one objective across worker threads.
pub trait Objective: Sync {
    fn cost(&self, theta: &Theta) -> OptResult<Cost>;
    fn check(&self, theta: &Theta) -> OptResult<()>;
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — simplex tolerance and iteration limit.
/// - `initial_step: f64` — relative per-coordinate perturbation used to build
///   the starting simplex around a guess.
/// - `timeout: Option<Duration>` — wall-clock budget per run.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
///
/// Default:
/// - `tols`: `tol_sd = 1e-6`, `max_iter = 400`
/// - `initial_step`: `DEFAULT_RELATIVE_STEP`
/// - `timeout`: `None`
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub tols: Tolerances,
    pub initial_step: f64,
    pub timeout: Option<Duration>,
    pub verbose: bool,
}

impl SearchOptions {
    pub fn new(
        tols: Tolerances, initial_step: f64, timeout: Option<Duration>, verbose: bool,
    ) -> OptResult<Self> {
        verify_initial_step(initial_step)?;
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(OptError::InvalidTimeout);
        }
        Ok(Self { tols, initial_step, timeout, verbose })
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_sd: Some(1e-6), max_iter: Some(400) },
            initial_step: DEFAULT_RELATIVE_STEP,
            timeout: None,
            verbose: false,
        }
    }
}

/// Stopping rules.
///
/// - `tol_sd`: terminate when the standard deviation of the simplex vertex
///   costs falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Either may be `None` but **at least one** must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_sd: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if both are `None`.
    /// - [`OptError::InvalidTolSd`] for non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(tol_sd: Option<f64>, max_iter: Option<usize>) -> OptResult<Self> {
        if tol_sd.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_sd(tol_sd)?;
        verify_max_iter(max_iter)?;
        Ok(Self { tol_sd, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best cost `c(θ̂)`; always finite.
/// - `converged`: `true` only when the solver met its own convergence test.
///   Runs stopped by the iteration budget or the timeout report `false` and
///   still carry the best state reached.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        let iterations = iterations as usize;
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn tolerances_require_at_least_one_rule() {
        assert_eq!(Tolerances::new(None, None), Err(OptError::NoTolerancesProvided));
        assert!(Tolerances::new(None, Some(10)).is_ok());
        assert!(matches!(Tolerances::new(Some(-1.0), None), Err(OptError::InvalidTolSd { .. })));
    }

    #[test]
    fn search_options_reject_zero_timeout_and_bad_step() {
        let tols = Tolerances::new(Some(1e-6), Some(50)).unwrap();

        assert_eq!(
            SearchOptions::new(tols, 0.05, Some(Duration::ZERO), false),
            Err(OptError::InvalidTimeout)
        );
        assert!(matches!(
            SearchOptions::new(tols, 0.0, None, false),
            Err(OptError::InvalidInitialStep { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Only solver-side convergence counts as converged; budget exhaustion
    // keeps the partial state but reports `converged = false`.
    fn outcome_maps_termination_reasons() {
        let ok = OptimOutcome::new(
            Some(array![0.5]),
            0.1,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            12,
            FnEvalMap::new(),
        )
        .unwrap();
        let budget = OptimOutcome::new(
            Some(array![0.5]),
            0.1,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            400,
            FnEvalMap::new(),
        )
        .unwrap();

        assert!(ok.converged);
        assert!(!budget.converged);
        assert_eq!(budget.iterations, 400);
        assert!(matches!(
            OptimOutcome::new(
                Some(array![0.5]),
                f64::INFINITY,
                TerminationStatus::NotTerminated,
                0,
                FnEvalMap::new()
            ),
            Err(OptError::NonFiniteCost { .. })
        ));
    }
}
