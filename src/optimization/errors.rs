//! optimization::errors — error surface of the simplex optimizer.
//!
//! Groups failures by where they arise: search options, the initial guess,
//! cost evaluation, the final outcome and the argmin backend. Errors raised
//! by an objective inside an argmin run are recovered as themselves rather
//! than wrapped.

use argmin::core::{ArgminError, Error};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::wells::errors::WellError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- SearchOptions ----
    /// Simplex standard-deviation tolerance needs to be positive and finite.
    InvalidTolSd {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one stopping rule must be provided.
    NoTolerancesProvided,
    /// Relative simplex step needs to be positive and finite.
    InvalidInitialStep {
        step: f64,
        reason: &'static str,
    },
    /// Wall-clock budget must be non-zero.
    InvalidTimeout,

    // ---- Initial guess ----
    /// Initial guess has no coordinates.
    EmptyTheta,
    /// Initial guess coordinates must be finite.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },
    /// The objective is infeasible (non-finite) at the initial guess.
    InfeasibleStart {
        value: f64,
    },
    /// Multi-start was called without any initial guess.
    NoStarts,

    // ---- Cost function ----
    /// Cost function returned NaN or -inf; only +inf is a valid penalty.
    InvalidCost {
        value: f64,
    },
    /// Best cost after the run is not finite.
    NonFiniteCost {
        value: f64,
    },
    /// Parameter vector length does not match the objective.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// Objective failed for a reason outside the optimizer's vocabulary.
    ObjectiveFailed {
        text: String,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Solver backend ----
    /// Error reported by the argmin executor or solver. `kind` names the
    /// argmin error class (`"invalid parameter"`, `"condition violated"`, ...)
    /// or `"other"` for errors outside argmin's vocabulary.
    Backend {
        kind: &'static str,
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- SearchOptions ----
            OptError::InvalidTolSd { tol, reason } => {
                write!(f, "Invalid simplex tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidInitialStep { step, reason } => {
                write!(f, "Invalid initial simplex step {step}: {reason}")
            }
            OptError::InvalidTimeout => {
                write!(f, "Invalid timeout: must be greater than zero")
            }

            // ---- Initial guess ----
            OptError::EmptyTheta => {
                write!(f, "Initial guess has no free parameters")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }
            OptError::InfeasibleStart { value } => {
                write!(f, "Initial guess is infeasible: objective value {value}")
            }
            OptError::NoStarts => {
                write!(f, "No initial guesses provided")
            }

            // ---- Cost function ----
            OptError::InvalidCost { value } => {
                write!(f, "Invalid cost value {value}: only finite values or +inf are allowed")
            }
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::ObjectiveFailed { text } => {
                write!(f, "Objective evaluation failed: {text}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Solver backend ----
            OptError::Backend { kind, text } => {
                write!(f, "Simplex solver failed ({kind}): {text}")
            }
        }
    }
}

fn argmin_kind(err: &ArgminError) -> &'static str {
    match err {
        ArgminError::InvalidParameter { .. } => "invalid parameter",
        ArgminError::NotImplemented { .. } => "not implemented",
        ArgminError::NotInitialized { .. } => "not initialized",
        ArgminError::ConditionViolated { .. } => "condition violated",
        ArgminError::CheckpointNotFound { .. } => "checkpoint not found",
        ArgminError::PotentialBug { .. } => "potential bug",
        ArgminError::ImpossibleError { .. } => "impossible error",
        _ => "argmin",
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        // Errors raised by our own objective travel through argmin boxed.
        let err = match err.downcast::<OptError>() {
            Ok(own) => return own,
            Err(err) => err,
        };
        match err.downcast_ref::<ArgminError>() {
            Some(argmin_err) => {
                OptError::Backend { kind: argmin_kind(argmin_err), text: argmin_err.to_string() }
            }
            None => OptError::Backend { kind: "other", text: err.to_string() },
        }
    }
}

impl From<WellError> for OptError {
    fn from(err: WellError) -> Self {
        match err {
            WellError::ThetaLengthMismatch { expected, actual } => {
                OptError::ThetaLengthMismatch { expected, actual }
            }
            other => OptError::ObjectiveFailed { text: other.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(format!("OptError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // An `OptError` raised inside the cost function survives the round trip
    // through argmin's boxed error type.
    fn from_argmin_error_recovers_own_variant() {
        let boxed: Error = OptError::InvalidCost { value: f64::NEG_INFINITY }.into();

        let back = OptError::from(boxed);

        assert_eq!(back, OptError::InvalidCost { value: f64::NEG_INFINITY });
    }

    #[test]
    fn from_argmin_error_tags_backend_kind() {
        let boxed: Error = ArgminError::InvalidParameter { text: "bad sd".to_string() }.into();

        match OptError::from(boxed) {
            OptError::Backend { kind, text } => {
                assert_eq!(kind, "invalid parameter");
                assert!(text.contains("bad sd"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_well_error_keeps_length_mismatch() {
        let err = OptError::from(WellError::ThetaLengthMismatch { expected: 2, actual: 1 });

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 2, actual: 1 });
        assert!(matches!(
            OptError::from(WellError::EmptyPopulation),
            OptError::ObjectiveFailed { .. }
        ));
    }
}
