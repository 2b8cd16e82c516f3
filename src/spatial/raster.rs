//! spatial::raster — groundwater-level grids, series summaries and sampling.
//!
//! Purpose
//! -------
//! Represent the depth-to-groundwater surfaces produced by the external
//! interpolation process and provide the read-only operations the core
//! needs: per-cell cross-layer reductions, scalar scaling, log-value
//! extraction for quantile work, and point sampling.
//!
//! Key behaviors
//! -------------
//! - [`Raster`] is a north-up regular grid; row 0 is the northern edge.
//! - [`RasterSeries`] validates that all layers share CRS and geometry and
//!   reduces them per cell ([`RasterSeries::cell_min`], `cell_max`,
//!   `cell_mean`), ignoring NaN (nodata) layers cell by cell.
//! - [`Raster::sample`] implements both nearest-cell and bilinear sampling;
//!   both are linear in the cell values, so sampling a raster scaled by `ω`
//!   equals `ω` times the unscaled sample.
//!
//! Invariants & assumptions
//! ------------------------
//! - NaN marks nodata. A cell whose layers are all NaN reduces to NaN.
//! - Sampling outside the grid extent, or on nodata, yields `None`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover validation, reductions with nodata, both sampling
//!   methods and the scaling/sampling commutation used by the decision rule.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::spatial::{
    crs::Crs,
    errors::{SpatialError, SpatialResult},
    geometry::Point,
};

/// Method used to read a raster value at an arbitrary point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Value of the cell containing the point.
    Nearest,
    /// Bilinear interpolation between the four surrounding cell centres.
    #[default]
    Bilinear,
}

/// Grid geometry shared by the layers of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub crs: Crs,
    /// x of the western edge.
    pub origin_x: f64,
    /// y of the northern edge.
    pub origin_y: f64,
    pub cell_size: f64,
}

impl GridSpec {
    pub fn new(crs: Crs, origin_x: f64, origin_y: f64, cell_size: f64) -> SpatialResult<Self> {
        if !origin_x.is_finite() || !origin_y.is_finite() {
            return Err(SpatialError::InvalidOrigin { x: origin_x, y: origin_y });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SpatialError::InvalidCellSize { value: cell_size });
        }
        Ok(GridSpec { crs, origin_x, origin_y, cell_size })
    }
}

/// A single groundwater-level layer (depth below land surface per cell).
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub spec: GridSpec,
    values: Array2<f64>,
}

impl Raster {
    /// Wrap a `(rows, cols)` array of cell values.
    ///
    /// Errors
    /// ------
    /// - `SpatialError::EmptyGrid` if either dimension is zero.
    pub fn new(spec: GridSpec, values: Array2<f64>) -> SpatialResult<Self> {
        let (rows, cols) = values.dim();
        if rows == 0 || cols == 0 {
            return Err(SpatialError::EmptyGrid { rows, cols });
        }
        Ok(Raster { spec, values })
    }

    pub fn crs(&self) -> Crs {
        self.spec.crs
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Every cell multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Raster {
        Raster { spec: self.spec, values: self.values.mapv(|v| v * factor) }
    }

    /// Natural logarithm of every finite, strictly positive cell.
    pub fn log_values(&self) -> Vec<f64> {
        self.values.iter().filter(|v| v.is_finite() && **v > 0.0).map(|v| v.ln()).collect()
    }

    /// Continuous (row, col) position of `p` in cell units, origin at the
    /// north-west corner; `None` outside the grid extent.
    ///
    /// The extent is half-open: the west and north edges belong to the grid,
    /// the east and south edges do not. A point exactly on the east or south
    /// edge is off-grid.
    fn grid_position(&self, p: Point) -> Option<(f64, f64)> {
        let (rows, cols) = self.dim();
        let col = (p.x - self.spec.origin_x) / self.spec.cell_size;
        let row = (self.spec.origin_y - p.y) / self.spec.cell_size;
        if !col.is_finite() || !row.is_finite() {
            return None;
        }
        if col < 0.0 || row < 0.0 || col >= cols as f64 || row >= rows as f64 {
            return None;
        }
        Some((row, col))
    }

    /// Value at `p` using `method`; `None` outside the grid or on nodata.
    pub fn sample(&self, p: Point, method: Sampling) -> Option<f64> {
        let (row, col) = self.grid_position(p)?;
        match method {
            Sampling::Nearest => {
                let v = self.values[[row.floor() as usize, col.floor() as usize]];
                v.is_finite().then_some(v)
            }
            Sampling::Bilinear => self.bilinear(row, col),
        }
    }

    // Interpolates between cell centres; nodata neighbours are skipped and the
    // remaining weights renormalised.
    fn bilinear(&self, row: f64, col: f64) -> Option<f64> {
        let (rows, cols) = self.dim();
        let fy = (row - 0.5).clamp(0.0, (rows - 1) as f64);
        let fx = (col - 0.5).clamp(0.0, (cols - 1) as f64);
        let r0 = fy.floor() as usize;
        let c0 = fx.floor() as usize;
        let r1 = (r0 + 1).min(rows - 1);
        let c1 = (c0 + 1).min(cols - 1);
        let ty = fy - r0 as f64;
        let tx = fx - c0 as f64;

        let taps = [
            (r0, c0, (1.0 - ty) * (1.0 - tx)),
            (r0, c1, (1.0 - ty) * tx),
            (r1, c0, ty * (1.0 - tx)),
            (r1, c1, ty * tx),
        ];
        let mut acc = 0.0;
        let mut weight = 0.0;
        for (r, c, w) in taps {
            let v = self.values[[r, c]];
            if v.is_finite() && w > 0.0 {
                acc += w * v;
                weight += w;
            }
        }
        if weight > 0.0 {
            return Some(acc / weight);
        }
        // Point sits exactly on a centre whose neighbours carry zero weight.
        let v = self.values[[fy.round() as usize, fx.round() as usize]];
        v.is_finite().then_some(v)
    }
}

/// Ordered seasonal layers sharing one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSeries {
    layers: Vec<Raster>,
}

impl RasterSeries {
    /// Validate that every layer shares layer 0's CRS, origin, cell size and
    /// dimensions.
    pub fn new(layers: Vec<Raster>) -> SpatialResult<Self> {
        let first = layers.first().ok_or(SpatialError::EmptySeries)?;
        for (index, layer) in layers.iter().enumerate().skip(1) {
            first.crs().ensure_same(layer.crs(), "raster series layers")?;
            if layer.spec != first.spec || layer.dim() != first.dim() {
                return Err(SpatialError::LayerGeometryMismatch { index });
            }
        }
        Ok(RasterSeries { layers })
    }

    pub fn layers(&self) -> &[Raster] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn crs(&self) -> Crs {
        self.layers[0].crs()
    }

    /// Per-cell minimum across layers.
    pub fn cell_min(&self) -> Raster {
        self.reduce(|vals| Statistics::min(vals.iter()))
    }

    /// Per-cell maximum across layers.
    pub fn cell_max(&self) -> Raster {
        self.reduce(|vals| Statistics::max(vals.iter()))
    }

    /// Per-cell arithmetic mean across layers.
    pub fn cell_mean(&self) -> Raster {
        self.reduce(|vals| Statistics::mean(vals.iter()))
    }

    fn reduce<F: Fn(&[f64]) -> f64>(&self, op: F) -> Raster {
        let first = &self.layers[0];
        let mut buf = Vec::with_capacity(self.layers.len());
        let values = Array2::from_shape_fn(first.dim(), |(r, c)| {
            buf.clear();
            buf.extend(self.layers.iter().map(|l| l.values[[r, c]]).filter(|v| !v.is_nan()));
            if buf.is_empty() { f64::NAN } else { op(&buf) }
        });
        Raster { spec: first.spec, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn spec() -> GridSpec {
        GridSpec::new(Crs::CA_ALBERS, 0.0, 2.0, 1.0).unwrap()
    }

    #[test]
    fn grid_spec_rejects_bad_cell_size_and_origin() {
        assert_eq!(
            GridSpec::new(Crs::CA_ALBERS, 0.0, 0.0, 0.0).unwrap_err(),
            SpatialError::InvalidCellSize { value: 0.0 }
        );
        assert!(matches!(
            GridSpec::new(Crs::CA_ALBERS, f64::NAN, 0.0, 1.0),
            Err(SpatialError::InvalidOrigin { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Cross-layer reductions ignore nodata per cell.
    //
    // Given
    // -----
    // - Two 2 x 2 layers; cell (0, 0) is NaN in the second layer.
    //
    // Expect
    // ------
    // - min/max/mean at (0, 0) equal the first layer's value.
    // - min/max/mean at (1, 1) are 4/8/6.
    fn series_reductions_skip_nodata() {
        let a = Raster::new(spec(), array![[10.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = Raster::new(spec(), array![[f64::NAN, 6.0], [7.0, 8.0]]).unwrap();
        let series = RasterSeries::new(vec![a, b]).unwrap();

        let (min, max, mean) = (series.cell_min(), series.cell_max(), series.cell_mean());

        assert_relative_eq!(min.values()[[0, 0]], 10.0);
        assert_relative_eq!(max.values()[[0, 0]], 10.0);
        assert_relative_eq!(mean.values()[[0, 0]], 10.0);
        assert_relative_eq!(min.values()[[1, 1]], 4.0);
        assert_relative_eq!(max.values()[[1, 1]], 8.0);
        assert_relative_eq!(mean.values()[[1, 1]], 6.0);
    }

    #[test]
    fn series_rejects_mismatched_layers() {
        let a = Raster::new(spec(), array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = Raster::new(spec(), array![[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]]).unwrap();

        assert_eq!(
            RasterSeries::new(vec![a, b]).unwrap_err(),
            SpatialError::LayerGeometryMismatch { index: 1 }
        );
        assert_eq!(RasterSeries::new(vec![]).unwrap_err(), SpatialError::EmptySeries);
    }

    #[test]
    // Purpose
    // -------
    // Nearest sampling reads the containing cell; points outside the extent
    // return `None`.
    fn nearest_sampling_reads_containing_cell() {
        let r = Raster::new(spec(), array![[1.0, 2.0], [3.0, 4.0]]).unwrap();

        assert_eq!(r.sample(Point::new(0.5, 1.5), Sampling::Nearest), Some(1.0));
        assert_eq!(r.sample(Point::new(1.5, 0.5), Sampling::Nearest), Some(4.0));
        assert_eq!(r.sample(Point::new(2.5, 0.5), Sampling::Nearest), None);
    }

    #[test]
    // Purpose
    // -------
    // The grid extent is half-open.
    //
    // Given
    // -----
    // - A 2x2 layer with unit cells, west edge x = 0, north edge y = 2.
    //
    // Expect
    // ------
    // - Points on the west or north edge sample with both methods.
    // - Points on the east (x = 2) or south (y = 0) edge are off-grid.
    fn extent_includes_west_and_north_edges_only() {
        let r = Raster::new(spec(), array![[1.0, 2.0], [3.0, 4.0]]).unwrap();

        for method in [Sampling::Nearest, Sampling::Bilinear] {
            assert!(r.sample(Point::new(0.0, 1.5), method).is_some());
            assert!(r.sample(Point::new(0.5, 2.0), method).is_some());
            assert_eq!(r.sample(Point::new(2.0, 1.5), method), None);
            assert_eq!(r.sample(Point::new(0.5, 0.0), method), None);
        }
        assert_eq!(r.sample(Point::new(0.0, 2.0), Sampling::Nearest), Some(1.0));
    }

    #[test]
    // Purpose
    // -------
    // Bilinear sampling interpolates between cell centres and equals the cell
    // value at a centre.
    //
    // Given
    // -----
    // - Layer [[1, 2], [3, 4]] with unit cells, north edge y = 2.
    //
    // Expect
    // ------
    // - Grid centre (1, 1) is the mean 2.5.
    // - Cell centre (0.5, 1.5) is 1.0.
    fn bilinear_sampling_interpolates_between_centres() {
        let r = Raster::new(spec(), array![[1.0, 2.0], [3.0, 4.0]]).unwrap();

        assert_relative_eq!(r.sample(Point::new(1.0, 1.0), Sampling::Bilinear).unwrap(), 2.5);
        assert_relative_eq!(r.sample(Point::new(0.5, 1.5), Sampling::Bilinear).unwrap(), 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Sampling commutes with scaling, which lets the decision rule scale a
    // per-well sample instead of re-sampling a scaled raster.
    fn sampling_commutes_with_scaling() {
        let r = Raster::new(spec(), array![[10.0, 20.0], [30.0, 45.0]]).unwrap();
        let p = Point::new(1.3, 0.7);

        for method in [Sampling::Nearest, Sampling::Bilinear] {
            let direct = r.scaled(1.37).sample(p, method).unwrap();
            let factored = 1.37 * r.sample(p, method).unwrap();
            assert_relative_eq!(direct, factored, max_relative = 1e-12);
        }
    }

    #[test]
    fn log_values_skip_nodata_and_non_positive_cells() {
        let r = Raster::new(spec(), array![[1.0, 0.0], [f64::NAN, std::f64::consts::E]]).unwrap();

        let logs = r.log_values();

        assert_eq!(logs.len(), 2);
        assert_relative_eq!(logs[1], 1.0);
    }
}
