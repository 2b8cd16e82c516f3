//! Errors for the well registry and the well-failure decision rule.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::spatial::errors::SpatialError;

/// Result alias for well-population and decision-rule operations.
pub type WellResult<T> = Result<T, WellError>;

/// Validation failures for registry records and rule parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum WellError {
    // ---- Registry ----
    /// The registry contains no wells.
    EmptyPopulation,
    /// Location of well `index` is NaN/±inf.
    NonFiniteLocation { index: usize },

    // ---- Rule parameters ----
    /// Pump-position fraction must be finite and within [0, 1].
    InvalidPumpFraction { value: f64 },
    /// Groundwater scale must be finite and > 0.
    InvalidScale { value: f64 },
    /// Parameter vector length does not match the model variant.
    ThetaLengthMismatch { expected: usize, actual: usize },

    // ---- Joins ----
    /// Spatial failure while joining wells to rasters or tessellations.
    Spatial(SpatialError),
}

impl std::error::Error for WellError {}

impl std::fmt::Display for WellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WellError::EmptyPopulation => write!(f, "Well registry is empty"),
            WellError::NonFiniteLocation { index } => {
                write!(f, "Well {index} has a non-finite location")
            }
            WellError::InvalidPumpFraction { value } => {
                write!(f, "Invalid pump-position fraction {value}, must be finite and in [0, 1]")
            }
            WellError::InvalidScale { value } => {
                write!(f, "Invalid groundwater scale {value}, must be finite and > 0")
            }
            WellError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, actual {actual}")
            }
            WellError::Spatial(err) => write!(f, "Spatial join failed: {err}"),
        }
    }
}

impl From<SpatialError> for WellError {
    fn from(err: SpatialError) -> Self {
        WellError::Spatial(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<WellError> for PyErr {
    fn from(err: WellError) -> PyErr {
        PyValueError::new_err(format!("WellError: {err}"))
    }
}
