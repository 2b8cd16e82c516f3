//! optimization — bounded simplex search and its error surface.
//!
//! Purpose
//! -------
//! Provide the numerical search used by calibration: an Argmin-backed
//! Nelder–Mead optimizer over a small free-parameter vector, plus a single
//! error/result surface. Callers implement an objective, choose stopping
//! rules, and obtain the best parameters and diagnostics without touching
//! backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose [`simplex_optimizer::minimize`] and
//!   [`simplex_optimizer::minimize_multistart`].
//! - Normalize configuration issues, invalid costs and backend solver errors
//!   into one enum (`errors::OptError`) with a common alias (`OptResult<T>`).
//!
//! Downstream usage
//! ----------------
//! - The calibration layer implements `Objective` for its SSE problem and
//!   converts non-converged outcomes into its own error type.

pub mod errors;
pub mod simplex_optimizer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::simplex_optimizer::prelude::*;
}
