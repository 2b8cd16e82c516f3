//! Errors for the calibration engine.
//!
//! `CalibError` is the crate's top-level error surface: spatial, well and
//! optimizer failures convert into it with `?`, and the calibration-specific
//! variants carry the diagnostics a caller needs to act on them (the bound
//! probe trace, the best partial optimizer state).

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{
    calibration::bounds::BoundProbe,
    optimization::{errors::OptError, simplex_optimizer::OptimOutcome},
    spatial::errors::SpatialError,
    wells::{errors::WellError, rule::ModelVariant},
};

/// Result alias for calibration operations.
pub type CalibResult<T> = Result<T, CalibError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibError {
    // ---- Configuration ----
    /// A configuration value is out of range or inconsistent.
    InvalidConfig { field: &'static str, reason: &'static str },
    /// Configuration text could not be parsed.
    ConfigParse { text: String },
    /// Configuration file could not be read.
    ConfigIo { text: String },
    /// Configuration schema version is not supported.
    UnsupportedSchema { found: u32, supported: u32 },

    // ---- Statistics ----
    /// Quantile level must lie in [0, 1].
    InvalidQuantile { q: f64 },
    /// A statistic was requested over an empty sample.
    EmptySample { context: &'static str },
    /// Observed and predicted vectors differ in length.
    LengthMismatch { observed: usize, predicted: usize },

    // ---- Targets ----
    /// Per-unit observations do not match the tessellation.
    UnitCountMismatch { expected: usize, found: usize },
    /// The bias filter retained no unit.
    EmptyTargetSet,

    // ---- Bounds ----
    /// The ω grid is malformed.
    InvalidGrid { start: f64, stop: f64, step: f64 },
    /// No ω interval satisfies the envelope; carries every probe evaluated.
    BoundsUnsatisfiable { reason: &'static str, trace: Vec<BoundProbe> },

    // ---- Optimization ----
    /// The configured initial guess lies outside the feasible region.
    InfeasibleStart { variant: ModelVariant, theta: Vec<f64> },
    /// Budget or timeout exhausted before convergence; carries the best state.
    NotConverged { variant: ModelVariant, best: Box<OptimOutcome> },

    // ---- Wrapped ----
    Spatial(SpatialError),
    Well(WellError),
    Opt(OptError),
}

impl std::error::Error for CalibError {}

impl std::fmt::Display for CalibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibError::InvalidConfig { field, reason } => {
                write!(f, "Invalid configuration value for '{field}': {reason}")
            }
            CalibError::ConfigParse { text } => write!(f, "Could not parse configuration: {text}"),
            CalibError::ConfigIo { text } => write!(f, "Could not read configuration: {text}"),
            CalibError::UnsupportedSchema { found, supported } => {
                write!(f, "Unsupported configuration schema {found} (supported: {supported})")
            }
            CalibError::InvalidQuantile { q } => {
                write!(f, "Invalid quantile level {q}, must be in [0, 1]")
            }
            CalibError::EmptySample { context } => write!(f, "Empty sample: {context}"),
            CalibError::LengthMismatch { observed, predicted } => {
                write!(f, "Length mismatch: {observed} observed vs {predicted} predicted values")
            }
            CalibError::UnitCountMismatch { expected, found } => {
                write!(f, "Unit count mismatch: expected {expected}, found {found}")
            }
            CalibError::EmptyTargetSet => write!(f, "Bias filter retained no reporting unit"),
            CalibError::InvalidGrid { start, stop, step } => {
                write!(f, "Invalid omega grid: start {start}, stop {stop}, step {step}")
            }
            CalibError::BoundsUnsatisfiable { reason, trace } => {
                write!(f, "Omega bounds unsatisfiable after {} probes: {reason}", trace.len())
            }
            CalibError::InfeasibleStart { variant, theta } => {
                write!(f, "Initial guess {theta:?} is infeasible for the {variant} model")
            }
            CalibError::NotConverged { variant, best } => write!(
                f,
                "The {variant} model did not converge ({}) after {} iterations; best SSE {}",
                best.status, best.iterations, best.value
            ),
            CalibError::Spatial(err) => write!(f, "{err}"),
            CalibError::Well(err) => write!(f, "{err}"),
            CalibError::Opt(err) => write!(f, "{err}"),
        }
    }
}

impl From<SpatialError> for CalibError {
    fn from(err: SpatialError) -> Self {
        CalibError::Spatial(err)
    }
}

impl From<WellError> for CalibError {
    fn from(err: WellError) -> Self {
        CalibError::Well(err)
    }
}

impl From<OptError> for CalibError {
    fn from(err: OptError) -> Self {
        CalibError::Opt(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<CalibError> for PyErr {
    fn from(err: CalibError) -> PyErr {
        PyValueError::new_err(format!("CalibError: {err}"))
    }
}
