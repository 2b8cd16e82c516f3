//! calibration — target selection, ω bounds, model fitting and prediction.
//!
//! Purpose
//! -------
//! Turn observed per-unit failure counts and a groundwater-level raster
//! series into calibrated pump-position parameters, then apply them at every
//! reporting scale.
//!
//! Key behaviors
//! -------------
//! - [`bias_filter`] keeps the units whose observed ratios fall inside the
//!   interquartile band and whose well counts are representative.
//! - [`bounds`] derives `(ω_lo, ω_hi)` from the log-scale envelope of the
//!   seasonal series.
//! - [`objective`] scores a parameter vector by the SSE between observed and
//!   predicted failure ratios.
//! - [`pipeline::Calibrator`] fits the null, single- and double-parameter
//!   models and predicts with the lowest-SSE one.
//!
//! Invariants & assumptions
//! ------------------------
//! - All inputs are borrowed immutably; a run never mutates the registry,
//!   rasters or tessellations.
//! - Calibration and prediction share one [`crate::wells::WellFailureRule`].
//!
//! Downstream usage
//! ----------------
//! - Build a [`crate::config::CalibrationConfig`], wrap it in a
//!   [`Calibrator`] and call [`Calibrator::run`] with [`CalibrationInputs`].

pub mod bias_filter;
pub mod bounds;
pub mod errors;
pub mod objective;
pub mod pipeline;
pub mod prediction;
pub mod quantile;

pub use self::bias_filter::{
    CalibrationTarget, CalibrationTargetSet, FilterReport, FilterSettings, FilterThresholds,
    select_targets,
};
pub use self::bounds::{BoundProbe, OmegaBounds, OmegaGrid, solve_omega_bounds};
pub use self::errors::{CalibError, CalibResult};
pub use self::objective::{CalibrationProblem, RuleCounts, count_with_rule, sse};
pub use self::pipeline::{
    CalibrationInputs, CalibrationReport, Calibrator, FittedModel, ModelComparison,
    ObservedUnits, PopulationAudit, ScalePredictions,
};
pub use self::prediction::{TessellationPrediction, UnitPrediction, predict};
pub use self::quantile::quantile;
