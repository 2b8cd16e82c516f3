//! spatial — coordinate references, polygons, rasters and spatial joins.
//!
//! Purpose
//! -------
//! Hold the spatial primitives the calibration engine consumes as opaque
//! inputs: reporting-unit tessellations, groundwater-level raster series and
//! the point-in-polygon aggregator reused by every later stage.
//!
//! Key behaviors
//! -------------
//! - [`crs::Crs`] is part of every spatial type's identity; joins check it
//!   and fail fast on mismatch instead of producing silently wrong results.
//! - [`aggregate`] resolves point-to-unit membership once and counts from
//!   that assignment, keeping dry/wet counts complementary.
//! - [`raster`] reduces a seasonal series per cell and samples it at well
//!   locations (nearest or bilinear).
//!
//! Conventions
//! -----------
//! - Coordinates are projected and planar; re-projection happens upstream.
//! - Depths are positive distances below land surface.
//! - Records falling outside a raster or tessellation are dropped and
//!   counted, never reassigned.

pub mod aggregate;
pub mod crs;
pub mod errors;
pub mod geometry;
pub mod raster;

pub use self::aggregate::{ReportingUnit, Tessellation, UnitAssignment, UnitCounts, count_points};
pub use self::crs::Crs;
pub use self::errors::{SpatialError, SpatialResult};
pub use self::geometry::{MultiPolygon, Point, Polygon, Ring};
pub use self::raster::{GridSpec, Raster, RasterSeries, Sampling};
