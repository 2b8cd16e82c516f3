//! simplex_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Centralizes the parameter/cost types and the Nelder–Mead solver alias so
//! the rest of the optimizer stays agnostic to `ndarray` and Argmin generics.
use argmin::{core::IterState, solver::neldermead::NelderMead};
use ndarray::Array1;
use std::collections::HashMap;

/// Free-parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Scalar objective value. `+inf` marks an infeasible candidate.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Nelder–Mead solver specialised to this crate's numeric types.
pub type Simplex = NelderMead<Theta, Cost>;

/// Executor state for derivative-free runs (no gradient, Jacobian or Hessian).
pub type SimplexState = IterState<Theta, (), (), (), (), Cost>;

/// Relative perturbation applied per coordinate when building the initial
/// simplex from a single guess.
pub const DEFAULT_RELATIVE_STEP: f64 = 0.05;

/// Absolute perturbation used instead for coordinates that are exactly zero.
pub const ZERO_COORD_STEP: f64 = 0.00025;
