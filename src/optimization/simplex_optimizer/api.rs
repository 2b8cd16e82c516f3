//! High-level entry points for minimizing a user-provided [`Objective`].
//!
//! [`minimize`] validates the starting point, builds a Nelder–Mead simplex
//! around it and delegates the run to [`run_simplex`]. [`minimize_multistart`]
//! runs several starts in parallel with `rayon` and keeps the best.
use rayon::prelude::*;

use crate::optimization::{
    errors::{OptError, OptResult},
    simplex_optimizer::{
        adapter::ArgMinAdapter,
        builders::build_simplex,
        run::run_simplex,
        traits::{Objective, OptimOutcome, SearchOptions},
        types::Theta,
        validation::validate_theta0,
    },
};

/// Minimize `f` from `theta0`.
///
/// # Errors
/// - `OptError::EmptyTheta` / `OptError::InvalidThetaInput` for malformed
///   guesses, or any error from [`Objective::check`].
/// - `OptError::InfeasibleStart` when `c(θ₀)` is not finite.
/// - Solver and validation errors from [`run_simplex`].
pub fn minimize<F: Objective>(f: &F, theta0: Theta, opts: &SearchOptions) -> OptResult<OptimOutcome> {
    validate_theta0(&theta0)?;
    f.check(&theta0)?;
    let start_cost = f.cost(&theta0)?;
    if !start_cost.is_finite() {
        return Err(OptError::InfeasibleStart { value: start_cost });
    }
    let solver = build_simplex(&theta0, opts)?;
    run_simplex(ArgMinAdapter::new(f), solver, opts)
}

/// Minimize `f` from every guess in `starts` and return the lowest-cost
/// outcome. Ties go to the earliest start, so the result does not depend on
/// thread scheduling.
///
/// Starts that fail are skipped as long as one succeeds; otherwise the first
/// failure (in start order) is returned.
pub fn minimize_multistart<F: Objective>(
    f: &F, starts: &[Theta], opts: &SearchOptions,
) -> OptResult<OptimOutcome> {
    if starts.is_empty() {
        return Err(OptError::NoStarts);
    }
    let runs: Vec<OptResult<OptimOutcome>> =
        starts.par_iter().map(|theta0| minimize(f, theta0.clone(), opts)).collect();
    select_best(runs)
}

fn select_best(runs: Vec<OptResult<OptimOutcome>>) -> OptResult<OptimOutcome> {
    let mut best: Option<OptimOutcome> = None;
    let mut first_err: Option<OptError> = None;
    for run in runs {
        match run {
            Ok(outcome) => {
                if best.as_ref().map_or(true, |b| outcome.value < b.value) {
                    best = Some(outcome);
                }
            }
            Err(err) => {
                first_err.get_or_insert(err);
            }
        }
    }
    match best {
        Some(outcome) => Ok(outcome),
        None => Err(first_err.unwrap_or(OptError::NoStarts)),
    }
}
