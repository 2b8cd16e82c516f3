//! Execution helper that runs the Nelder–Mead solver on an objective and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    simplex_optimizer::{
        adapter::ArgMinAdapter,
        traits::{Objective, OptimOutcome, SearchOptions},
        types::Simplex,
    },
};
use argmin::core::{Executor, State};

/// Run a prepared simplex solver.
///
/// Wires up the adapted objective, the iteration budget (`max_iter`), the
/// optional wall-clock `timeout` and, behind `obs_slog` with
/// `opts.verbose == true`, a terminal slog observer. The best vertex seen is
/// returned even when the budget or timeout stops the run; the outcome's
/// `converged` flag tells the two apart.
///
/// # Errors
/// - Propagates any `argmin` runtime error, including `OptError`s raised by
///   the objective, via `From<argmin::core::Error>`.
/// - Propagates validation errors from [`OptimOutcome::new`] (e.g. every
///   evaluated vertex was infeasible).
pub fn run_simplex<F: Objective>(
    problem: ArgMinAdapter<'_, F>, solver: Simplex, opts: &SearchOptions,
) -> OptResult<OptimOutcome> {
    let mut optimizer = Executor::new(problem, solver);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }
    if let Some(timeout) = opts.timeout {
        optimizer = optimizer.timeout(timeout);
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
    )
}
