//! utils — conversion helpers for the Python bindings.
//!
//! Python callers hand over plain nested lists; these helpers turn them into
//! the validated spatial and well types before any core routine runs.

#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

#[cfg(feature = "python-bindings")]
use crate::{
    spatial::{
        crs::Crs,
        raster::{GridSpec, Raster, RasterSeries},
    },
    wells::rule::PumpParams,
};

/// Build a rectangular layer from row-major nested lists.
#[cfg(feature = "python-bindings")]
pub fn extract_layer(spec: GridSpec, rows: Vec<Vec<f64>>) -> PyResult<Raster> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if n_rows == 0 || n_cols == 0 {
        return Err(PyValueError::new_err("raster layers must have at least one cell"));
    }
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(PyValueError::new_err("raster layer rows must all have the same length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let values = Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| PyValueError::new_err(format!("invalid raster shape: {e}")))?;
    Ok(Raster::new(spec, values)?)
}

/// Build a raster series whose layers share one grid geometry.
#[cfg(feature = "python-bindings")]
pub fn extract_series(
    layers: Vec<Vec<Vec<f64>>>, origin_x: f64, origin_y: f64, cell_size: f64, epsg: u32,
) -> PyResult<RasterSeries> {
    let spec = GridSpec::new(Crs::epsg(epsg), origin_x, origin_y, cell_size)?;
    let rasters =
        layers.into_iter().map(|rows| extract_layer(spec, rows)).collect::<PyResult<Vec<_>>>()?;
    Ok(RasterSeries::new(rasters)?)
}

#[cfg(feature = "python-bindings")]
pub fn extract_params(d: f64, omega: f64) -> PyResult<PumpParams> {
    Ok(PumpParams::new(d, omega)?)
}

/// Reject per-well columns of different lengths.
#[cfg(feature = "python-bindings")]
pub fn ensure_same_len(columns: &[(&str, usize)]) -> PyResult<usize> {
    let n = columns.first().map_or(0, |c| c.1);
    for (name, len) in columns {
        if *len != n {
            return Err(PyValueError::new_err(format!(
                "column '{name}' has {len} entries, expected {n}"
            )));
        }
    }
    Ok(n)
}
