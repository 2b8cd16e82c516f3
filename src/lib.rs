//! well_failure — calibration and prediction of domestic well failure.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the decision rule, the ω bound solver and the SSE objective to Python via
//! the `_well_failure` extension module (behind the `python-bindings`
//! feature).
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: `spatial` (CRS, polygons, rasters, joins),
//!   `wells` (registry, filters, decision rule), `calibration` (bias filter,
//!   bounds, objective, pipeline, prediction), `optimization` (Nelder–Mead)
//!   and `config` (versioned JSON configuration).
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_well_failure` extension and register its `calibration` submodule in
//!   `sys.modules`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input validation and error mapping.
//! - Depths are positive distances below land surface and coordinates are
//!   projected; re-projection happens before data reaches this crate.
//!
//! Downstream usage
//! ----------------
//! - Rust callers typically load a [`config::CalibrationConfig`], build a
//!   [`calibration::Calibrator`] and call `run` with borrowed inputs.
//! - The Python packaging layer imports `_well_failure.calibration` for
//!   scenario work on individual wells and raster series.
//!
//! Testing notes
//! -------------
//! - Each inner module carries unit tests; `tests/` holds an end-to-end
//!   synthetic calibration run.

pub mod calibration;
pub mod config;
pub mod optimization;
pub mod spatial;
pub mod utils;
pub mod wells;

#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{
        bounds::{OmegaBounds, OmegaGrid, solve_omega_bounds},
        objective,
    },
    utils::{ensure_same_len, extract_params, extract_series},
    wells::rule::{WellFailureRule, active_cutoff_year},
};

/// WellFailureRule — Python-facing wrapper for the per-well decision rule.
///
/// Purpose
/// -------
/// Evaluate the dry/not-dry rule for single wells or whole columns of wells
/// under explicit `(d, ω)` values.
///
/// Parameters
/// ----------
/// Constructed from Python via `WellFailureRule(reference_year=2012,
/// retirement_age=33)`; the active cutoff is their difference.
///
/// Notes
/// -----
/// - Evaluation returns `None` for wells excluded by the retirement rule.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "WellFailureRule", module = "well_failure.calibration")]
pub struct PyWellFailureRule {
    inner: WellFailureRule,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyWellFailureRule {
    #[new]
    #[pyo3(
        text_signature = "(reference_year=2012, retirement_age=33)",
        signature = (reference_year = 2012, retirement_age = 33)
    )]
    pub fn new(reference_year: i32, retirement_age: i32) -> PyResult<PyWellFailureRule> {
        if retirement_age < 0 {
            return Err(pyo3::exceptions::PyValueError::new_err(
                "retirement_age must be non-negative",
            ));
        }
        let cutoff = active_cutoff_year(reference_year, retirement_age);
        Ok(PyWellFailureRule { inner: WellFailureRule::new(cutoff) })
    }

    #[getter]
    pub fn cutoff_year(&self) -> i32 {
        self.inner.cutoff_year
    }

    /// Dry flag for one well, or `None` when the well is retired or undated.
    #[pyo3(signature = (year, screened_bottom, gw_mean, d, omega = 1.0))]
    pub fn evaluate(
        &self, year: Option<i32>, screened_bottom: f64, gw_mean: f64, d: f64, omega: f64,
    ) -> PyResult<Option<bool>> {
        let params = extract_params(d, omega)?;
        Ok(self.inner.evaluate(year, screened_bottom, gw_mean, params))
    }

    /// Dry flags for parallel columns of completion years, screened bottoms
    /// and mean groundwater levels.
    #[pyo3(signature = (years, screened_bottoms, gw_means, d, omega = 1.0))]
    pub fn evaluate_many(
        &self, years: Vec<Option<i32>>, screened_bottoms: Vec<f64>, gw_means: Vec<f64>, d: f64,
        omega: f64,
    ) -> PyResult<Vec<Option<bool>>> {
        ensure_same_len(&[
            ("years", years.len()),
            ("screened_bottoms", screened_bottoms.len()),
            ("gw_means", gw_means.len()),
        ])?;
        let params = extract_params(d, omega)?;
        Ok(years
            .iter()
            .zip(&screened_bottoms)
            .zip(&gw_means)
            .map(|((&y, &b), &g)| self.inner.evaluate(y, b, g, params))
            .collect())
    }
}

/// OmegaBounds — Python-facing result of the ω bound solver.
///
/// Purpose
/// -------
/// Solve `(ω_lo, ω_hi)` for a seasonal raster series passed as a list of
/// row-major layers and expose the bounds, envelope and probe trace.
///
/// Parameters
/// ----------
/// Constructed from Python via `OmegaBounds(layers, origin_x, origin_y,
/// cell_size, epsg=3310, start=0.01, stop=2.0, step=0.01, lower_q=0.05,
/// upper_q=0.95)`.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "OmegaBounds", module = "well_failure.calibration")]
pub struct PyOmegaBounds {
    inner: OmegaBounds,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyOmegaBounds {
    #[new]
    #[pyo3(
        text_signature = "(layers, origin_x, origin_y, cell_size, /, epsg=3310, start=0.01, stop=2.0, step=0.01, lower_q=0.05, upper_q=0.95)",
        signature = (
            layers, origin_x, origin_y, cell_size, epsg = 3310, start = 0.01, stop = 2.0,
            step = 0.01, lower_q = 0.05, upper_q = 0.95
        )
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        py: Python<'_>, layers: Vec<Vec<Vec<f64>>>, origin_x: f64, origin_y: f64, cell_size: f64,
        epsg: u32, start: f64, stop: f64, step: f64, lower_q: f64, upper_q: f64,
    ) -> PyResult<PyOmegaBounds> {
        let series = extract_series(layers, origin_x, origin_y, cell_size, epsg)?;
        let grid = OmegaGrid { start, stop, step, lower_q, upper_q };
        let inner = py.allow_threads(|| solve_omega_bounds(&series, &grid))?;
        Ok(PyOmegaBounds { inner })
    }

    #[getter]
    pub fn lower(&self) -> f64 {
        self.inner.lower
    }

    #[getter]
    pub fn upper(&self) -> f64 {
        self.inner.upper
    }

    #[getter]
    pub fn envelope(&self) -> (f64, f64) {
        (self.inner.env_low, self.inner.env_high)
    }

    /// `(ω, lower quantile, upper quantile)` per grid candidate.
    #[getter]
    pub fn trace(&self) -> Vec<(f64, f64, f64)> {
        self.inner.trace.iter().map(|p| (p.omega, p.lower, p.upper)).collect()
    }

    pub fn contains(&self, omega: f64) -> bool {
        self.inner.contains(omega)
    }
}

/// Sum of squared differences between observed and predicted ratios,
/// skipping pairs where either value is NaN.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(text_signature = "(observed, predicted, /)")]
pub fn sse(observed: Vec<f64>, predicted: Vec<f64>) -> PyResult<f64> {
    Ok(objective::sse(&observed, &predicted)?)
}

/// _well_failure — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `calibration` submodule and attach it to `_well_failure`.
/// - Register it in `sys.modules` so `well_failure.calibration` imports
///   resolve.
///
/// Errors
/// ------
/// - `PyErr` if creating the submodule or updating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _well_failure<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let calibration_mod = PyModule::new(_py, "calibration")?;
    calibration(_py, m, &calibration_mod)?;

    // Register the submodule so dotted imports work.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("well_failure.calibration", calibration_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn calibration<'py>(
    _py: Python, well_failure: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyWellFailureRule>()?;
    m.add_class::<PyOmegaBounds>()?;
    m.add_function(wrap_pyfunction!(sse, m)?)?;
    well_failure.add_submodule(m)?;
    Ok(())
}
