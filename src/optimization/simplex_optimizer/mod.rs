//! simplex_optimizer — bounded, derivative-free minimization via argmin.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed Nelder–Mead layer for **minimizing**
//! piecewise-constant objectives such as count-based squared errors, where
//! gradients do not exist. Callers implement [`Objective`] and invoke
//! [`minimize`] (one start) or [`minimize_multistart`] (several starts in
//! parallel).
//!
//! Key behaviors
//! -------------
//! - Box constraints are expressed as a penalty: infeasible candidates cost
//!   `+inf`, which the simplex treats as the worst vertex.
//! - [`minimize`] validates the initial guess, requires it to be feasible,
//!   builds the starting simplex via [`builders`] and executes it via
//!   [`run::run_simplex`].
//! - Runs honour an iteration budget and an optional wall-clock timeout; the
//!   outcome records whether the solver actually converged.
//!
//! Invariants & assumptions
//! ------------------------
//! - Because the start is feasible and infeasible vertices cost `+inf`, the
//!   best vertex reported is always feasible.
//! - Objectives are pure and `Sync`; runs are deterministic for a fixed
//!   objective, start and option set.
//! - NaN and `-inf` costs are errors, never penalties.
//!
//! Conventions
//! -----------
//! - Parameters are [`Theta`] (`Array1<f64>`), costs are [`Cost`] (`f64`).
//! - Errors bubble up as [`OptResult<T>`](crate::optimization::errors::OptResult);
//!   this module never logs or panics.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover option validation, the starting-simplex
//!   layout, cost screening in the adapter and end-to-end runs on toy bowls
//!   (interior optimum, penalty box, budget exhaustion, multi-start).

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{minimize, minimize_multistart};
pub use self::traits::{Objective, OptimOutcome, SearchOptions, Tolerances};
pub use self::types::{Cost, DEFAULT_RELATIVE_STEP, FnEvalMap, Theta};

pub mod prelude {
    pub use super::api::{minimize, minimize_multistart};
    pub use super::traits::{Objective, OptimOutcome, SearchOptions, Tolerances};
    pub use super::types::{Cost, Theta};
}
