//! spatial::errors — error surface for geometry, raster and join operations.
//!
//! Purpose
//! -------
//! Provide a single error enum and result alias for every spatial primitive
//! in this crate: coordinate-reference checks, polygon construction, raster
//! grids and raster series. Spatial code never panics on malformed inputs;
//! it reports a [`SpatialError`] so callers can surface a typed reason.
//!
//! Conventions
//! -----------
//! - Indices are 0-based.
//! - Records that merely fall outside a raster or tessellation are *not*
//!   errors; they are dropped and counted by the join that encountered them.
//!   Only structural problems (mismatched CRS, malformed grids) are reported
//!   here.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::spatial::crs::Crs;

/// Result alias for spatial operations.
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Structural failures raised by spatial types and joins.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialError {
    // ---- Coordinate reference ----
    /// Two inputs to the same join carry different coordinate references.
    CrsMismatch { expected: Crs, found: Crs, context: &'static str },

    // ---- Geometry ----
    /// A polygon ring needs at least three distinct vertices.
    DegenerateRing { vertices: usize },
    /// A vertex coordinate is NaN/±inf.
    NonFiniteVertex { index: usize },
    /// A multi-polygon without any member polygon.
    EmptyGeometry,

    // ---- Raster grids ----
    /// Grid dimensions must be strictly positive.
    EmptyGrid { rows: usize, cols: usize },
    /// Cell size must be finite and strictly positive.
    InvalidCellSize { value: f64 },
    /// Origin coordinates must be finite.
    InvalidOrigin { x: f64, y: f64 },
    /// A raster series needs at least one layer.
    EmptySeries,
    /// Layer `index` does not share the geometry of layer 0.
    LayerGeometryMismatch { index: usize },
    /// A reduction found no usable (finite, positive) cell values.
    NoValidCells { context: &'static str },
}

impl std::error::Error for SpatialError {}

impl std::fmt::Display for SpatialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpatialError::CrsMismatch { expected, found, context } => {
                write!(f, "CRS mismatch in {context}: expected {expected}, found {found}")
            }
            SpatialError::DegenerateRing { vertices } => {
                write!(f, "Degenerate polygon ring with {vertices} vertices, need at least 3")
            }
            SpatialError::NonFiniteVertex { index } => {
                write!(f, "Non-finite vertex coordinate at index {index}")
            }
            SpatialError::EmptyGeometry => write!(f, "Geometry contains no polygons"),
            SpatialError::EmptyGrid { rows, cols } => {
                write!(f, "Raster grid must be non-empty, got {rows} x {cols}")
            }
            SpatialError::InvalidCellSize { value } => {
                write!(f, "Invalid cell size {value}, must be finite and > 0")
            }
            SpatialError::InvalidOrigin { x, y } => {
                write!(f, "Invalid raster origin ({x}, {y}), must be finite")
            }
            SpatialError::EmptySeries => write!(f, "Raster series contains no layers"),
            SpatialError::LayerGeometryMismatch { index } => {
                write!(f, "Raster layer {index} does not share the series grid geometry")
            }
            SpatialError::NoValidCells { context } => {
                write!(f, "No finite, positive cell values available for {context}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SpatialError> for PyErr {
    fn from(err: SpatialError) -> PyErr {
        PyValueError::new_err(format!("SpatialError: {err}"))
    }
}
