//! wells::population — immutable well registry and filter pipeline.
//!
//! Purpose
//! -------
//! Hold the well-construction registry once and expose the successive
//! filtering stages (valid completion year, non-negative water column,
//! active-at-reference-year, groundwater sample available) as pure
//! functions that each return a new index view over the unchanged backing
//! array.
//!
//! Key behaviors
//! -------------
//! - [`WellPopulation`] owns the records and their coordinate reference.
//! - [`WellSubset`] is a borrowed view (`&WellPopulation` + indices); every
//!   filter consumes one view and returns another, so no stage can alias or
//!   mutate another stage's data.
//! - [`WellSubset::with_groundwater_sample`] joins the per-cell mean raster at
//!   each well once, producing a [`SampledWells`] view. Wells outside the
//!   raster (or on nodata) are dropped and counted.
//!
//! Invariants & assumptions
//! ------------------------
//! - Indices in a view are strictly increasing and valid for the backing
//!   population.
//! - `SampledWells::gw_mean()[k]` is the unscaled mean-raster sample of the
//!   well at `indices()[k]`; scaling by `ω` happens inside the decision rule.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each filter, chaining, dropped-sample accounting and
//!   CRS mismatch between wells and raster.

use crate::{
    spatial::{
        crs::Crs,
        geometry::Point,
        raster::{Raster, Sampling},
    },
    wells::errors::{WellError, WellResult},
};

/// One registry record.
#[derive(Debug, Clone, PartialEq)]
pub struct Well {
    pub id: String,
    pub location: Point,
    /// Completion year; `None` when the registry date is missing or invalid.
    pub year: Option<i32>,
    /// Depth of the screened-interval bottom below land surface.
    pub screened_bottom: f64,
}

impl Well {
    pub fn new(
        id: impl Into<String>, location: Point, year: Option<i32>, screened_bottom: f64,
    ) -> Self {
        Well { id: id.into(), location, year, screened_bottom }
    }

    /// Water-column height measured from land surface (datum 0).
    pub fn water_column_height(&self) -> f64 {
        self.screened_bottom
    }
}

/// Validated, immutable well registry.
#[derive(Debug, Clone, PartialEq)]
pub struct WellPopulation {
    crs: Crs,
    wells: Vec<Well>,
}

impl WellPopulation {
    /// Errors
    /// ------
    /// - `WellError::EmptyPopulation` when `wells` is empty.
    /// - `WellError::NonFiniteLocation` for the first well with NaN/±inf
    ///   coordinates.
    pub fn new(crs: Crs, wells: Vec<Well>) -> WellResult<Self> {
        if wells.is_empty() {
            return Err(WellError::EmptyPopulation);
        }
        if let Some(index) = wells.iter().position(|w| !w.location.is_finite()) {
            return Err(WellError::NonFiniteLocation { index });
        }
        Ok(WellPopulation { crs, wells })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// View over every record.
    pub fn all(&self) -> WellSubset<'_> {
        WellSubset { population: self, indices: (0..self.wells.len()).collect() }
    }
}

/// Index view over a [`WellPopulation`].
#[derive(Debug, Clone, PartialEq)]
pub struct WellSubset<'a> {
    population: &'a WellPopulation,
    indices: Vec<usize>,
}

impl<'a> WellSubset<'a> {
    pub fn population(&self) -> &'a WellPopulation {
        self.population
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Well> + '_ {
        let wells = self.population.wells();
        self.indices.iter().map(move |&i| &wells[i])
    }

    pub fn locations(&self) -> Vec<Point> {
        self.iter().map(|w| w.location).collect()
    }

    fn retain<F: Fn(&Well) -> bool>(&self, keep: F) -> WellSubset<'a> {
        let wells = self.population.wells();
        let indices = self.indices.iter().copied().filter(|&i| keep(&wells[i])).collect();
        WellSubset { population: self.population, indices }
    }

    /// Wells with a completion year on record.
    pub fn with_valid_year(&self) -> WellSubset<'a> {
        self.retain(|w| w.year.is_some())
    }

    /// Wells whose water column is finite and non-negative. Negative columns
    /// mark wells already dry before the drought.
    pub fn with_non_negative_column(&self) -> WellSubset<'a> {
        self.retain(|w| {
            let wch = w.water_column_height();
            wch.is_finite() && wch >= 0.0
        })
    }

    /// Wells completed in or after `cutoff_year`.
    pub fn active(&self, cutoff_year: i32) -> WellSubset<'a> {
        self.retain(|w| w.year.is_some_and(|y| y >= cutoff_year))
    }

    /// Join the mean groundwater-level raster at each well.
    ///
    /// Errors
    /// ------
    /// - `WellError::Spatial(CrsMismatch)` if the raster and population use
    ///   different references.
    pub fn with_groundwater_sample(
        &self, mean_layer: &Raster, sampling: Sampling,
    ) -> WellResult<SampledWells<'a>> {
        self.population.crs.ensure_same(mean_layer.crs(), "well/raster join")?;
        let wells = self.population.wells();
        let mut indices = Vec::with_capacity(self.indices.len());
        let mut gw_mean = Vec::with_capacity(self.indices.len());
        for &i in &self.indices {
            if let Some(v) = mean_layer.sample(wells[i].location, sampling) {
                indices.push(i);
                gw_mean.push(v);
            }
        }
        let dropped = self.indices.len() - indices.len();
        if dropped > 0 {
            log::warn!("{dropped} wells fall outside the groundwater raster and were dropped");
        }
        Ok(SampledWells { population: self.population, indices, gw_mean, sampling, dropped })
    }
}

/// Wells paired with their unscaled mean groundwater-level sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledWells<'a> {
    population: &'a WellPopulation,
    indices: Vec<usize>,
    gw_mean: Vec<f64>,
    sampling: Sampling,
    dropped: usize,
}

impl<'a> SampledWells<'a> {
    pub fn population(&self) -> &'a WellPopulation {
        self.population
    }

    pub fn crs(&self) -> Crs {
        self.population.crs()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn gw_mean(&self) -> &[f64] {
        &self.gw_mean
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Wells dropped because no raster value was available at their location.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `k`-th well of the view.
    pub fn well(&self, k: usize) -> &'a Well {
        &self.population.wells()[self.indices[k]]
    }

    pub fn locations(&self) -> Vec<Point> {
        (0..self.len()).map(|k| self.well(k).location).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{errors::SpatialError, raster::GridSpec};
    use ndarray::Array2;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Registry validation.
    // - Each filter stage and chaining of stages.
    // - Groundwater sampling join, including dropped wells and CRS checks.
    // -------------------------------------------------------------------------

    fn population() -> WellPopulation {
        WellPopulation::new(
            Crs::CA_ALBERS,
            vec![
                Well::new("w0", Point::new(0.5, 0.5), Some(1990), 50.0),
                Well::new("w1", Point::new(1.5, 0.5), None, 60.0),
                Well::new("w2", Point::new(0.5, 1.5), Some(1970), 40.0),
                Well::new("w3", Point::new(1.5, 1.5), Some(2005), -3.0),
                Well::new("w4", Point::new(9.0, 9.0), Some(2010), 80.0),
            ],
        )
        .unwrap()
    }

    fn flat_raster(value: f64) -> Raster {
        let spec = GridSpec::new(Crs::CA_ALBERS, 0.0, 2.0, 1.0).unwrap();
        Raster::new(spec, Array2::from_elem((2, 2), value)).unwrap()
    }

    #[test]
    fn population_new_rejects_empty_and_non_finite() {
        assert_eq!(WellPopulation::new(Crs::CA_ALBERS, vec![]).unwrap_err(), WellError::EmptyPopulation);
        let bad = vec![Well::new("w", Point::new(f64::NAN, 0.0), Some(2000), 10.0)];
        assert_eq!(
            WellPopulation::new(Crs::CA_ALBERS, bad).unwrap_err(),
            WellError::NonFiniteLocation { index: 0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Filters are pure: chaining yields the expected indices and leaves the
    // input view untouched.
    //
    // Given
    // -----
    // - Five wells: one without year, one retired (1970), one with negative
    //   column, two otherwise valid.
    //
    // Expect
    // ------
    // - valid year -> [0, 2, 3, 4]; non-negative -> [0, 2, 4];
    //   active(1979) -> [0, 4].
    fn filters_chain_without_mutating_inputs() {
        let pop = population();
        let all = pop.all();

        let dated = all.with_valid_year();
        let wet = dated.with_non_negative_column();
        let active = wet.active(1979);

        assert_eq!(all.len(), 5);
        assert_eq!(dated.indices(), &[0, 2, 3, 4]);
        assert_eq!(wet.indices(), &[0, 2, 4]);
        assert_eq!(active.indices(), &[0, 4]);
    }

    #[test]
    // Purpose
    // -------
    // Wells outside the raster are dropped from the sampled view and counted.
    fn groundwater_sample_drops_wells_outside_raster() {
        let pop = population();
        let view = pop.all().with_valid_year().with_non_negative_column();

        let sampled = view.with_groundwater_sample(&flat_raster(42.0), Sampling::Nearest).unwrap();

        assert_eq!(sampled.indices(), &[0, 2]);
        assert_eq!(sampled.gw_mean(), &[42.0, 42.0]);
        assert_eq!(sampled.dropped(), 1);
        assert_eq!(sampled.well(1).id, "w2");
    }

    #[test]
    fn groundwater_sample_rejects_crs_mismatch() {
        let pop = population();
        let spec = GridSpec::new(Crs::epsg(4326), 0.0, 2.0, 1.0).unwrap();
        let raster = Raster::new(spec, Array2::from_elem((2, 2), 1.0)).unwrap();

        let err = pop.all().with_groundwater_sample(&raster, Sampling::Bilinear).unwrap_err();

        assert!(matches!(err, WellError::Spatial(SpatialError::CrsMismatch { .. })));
    }
}
