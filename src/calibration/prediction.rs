//! calibration::prediction — apply fitted parameters at every reporting scale.
//!
//! Re-evaluates the same [`WellFailureRule`] used during calibration over the
//! full sampled active population and aggregates the flags onto any
//! tessellation. Each call builds its own assignment from immutable inputs,
//! so applying it twice yields identical output.

use crate::{
    calibration::{errors::CalibResult, objective::count_with_rule},
    spatial::aggregate::{Tessellation, UnitAssignment},
    wells::{
        population::SampledWells,
        rule::{PumpParams, WellFailureRule},
    },
};

/// Predicted failure statistics for one reporting unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPrediction {
    pub id: String,
    pub dry: u64,
    pub wet: u64,
    pub active: u64,
    /// `100 × dry / active`; `None` for units without active wells.
    pub failure_pct: Option<f64>,
    pub label: String,
}

impl UnitPrediction {
    fn new(id: &str, dry: u64, active: u64) -> Self {
        let failure_pct = (active > 0).then(|| 100.0 * dry as f64 / active as f64);
        let label = match failure_pct {
            Some(pct) => format!("{id}: {dry} of {active} wells dry ({pct:.1}%)"),
            None => format!("{id}: no active wells"),
        };
        UnitPrediction { id: id.to_string(), dry, wet: active - dry, active, failure_pct, label }
    }
}

/// Predictions for every unit of one tessellation, in unit order.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellationPrediction {
    pub tessellation: String,
    pub units: Vec<UnitPrediction>,
    /// Wells located in no unit of this tessellation.
    pub dropped: usize,
}

impl TessellationPrediction {
    pub fn total_dry(&self) -> u64 {
        self.units.iter().map(|u| u.dry).sum()
    }

    pub fn total_active(&self) -> u64 {
        self.units.iter().map(|u| u.active).sum()
    }
}

/// Predict per-unit failure on `tessellation` with `params`.
pub fn predict(
    wells: &SampledWells<'_>, tessellation: &Tessellation, rule: WellFailureRule,
    params: PumpParams,
) -> CalibResult<TessellationPrediction> {
    let assignment = UnitAssignment::assign(&wells.locations(), wells.crs(), tessellation)?;
    let counts = count_with_rule(wells, &assignment, rule, params);
    let units = tessellation
        .units
        .iter()
        .enumerate()
        .map(|(u, unit)| UnitPrediction::new(&unit.id, counts.dry[u], counts.active[u]))
        .collect();
    let prediction = TessellationPrediction {
        tessellation: tessellation.name.clone(),
        units,
        dropped: assignment.dropped(),
    };
    log::debug!(
        "prediction on '{}': {} of {} wells dry",
        prediction.tessellation,
        prediction.total_dry(),
        prediction.total_active()
    );
    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{
        aggregate::ReportingUnit,
        crs::Crs,
        geometry::{Point, square},
        raster::{GridSpec, Raster, Sampling},
    };
    use crate::wells::population::{Well, WellPopulation};
    use ndarray::Array2;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Complementarity of dry and wet counts per unit.
    // - Label and percentage formatting, including empty units.
    // - Idempotence of repeated application.
    // -------------------------------------------------------------------------

    fn setup() -> (WellPopulation, Tessellation, Raster) {
        let wells = vec![
            Well::new("a", Point::new(1.0, 1.0), Some(2000), 30.0),
            Well::new("b", Point::new(2.0, 1.0), Some(2000), 60.0),
            Well::new("c", Point::new(3.0, 1.0), Some(1950), 10.0),
            Well::new("d", Point::new(6.0, 1.0), Some(2001), 45.0),
        ];
        let tess = Tessellation::new(
            "township",
            Crs::CA_ALBERS,
            vec![
                ReportingUnit::new("T1", square(0.0, 0.0, 5.0).unwrap()),
                ReportingUnit::new("T2", square(5.0, 0.0, 5.0).unwrap()),
                ReportingUnit::new("T3", square(20.0, 20.0, 5.0).unwrap()),
            ],
        );
        let spec = GridSpec::new(Crs::CA_ALBERS, 0.0, 10.0, 10.0).unwrap();
        let raster = Raster::new(spec, Array2::from_elem((1, 1), 40.0)).unwrap();
        (WellPopulation::new(Crs::CA_ALBERS, wells).unwrap(), tess, raster)
    }

    #[test]
    // Purpose
    // -------
    // Per-unit dry + wet = active, retired wells are excluded and labels
    // carry the counts.
    //
    // Given
    // -----
    // - gw 40 ft, d = 1: well a (30 ft) dry, b (60 ft) wet, c retired,
    //   d (45 ft) wet.
    //
    // Expect
    // ------
    // - T1: 1 of 2 dry (50.0%); T2: 0 of 1; T3: no active wells.
    fn predict_counts_and_labels_units() {
        let (pop, tess, raster) = setup();
        let sampled = pop.all().with_groundwater_sample(&raster, Sampling::Nearest).unwrap();

        let p = predict(&sampled, &tess, WellFailureRule::new(1979), PumpParams { d: 1.0, omega: 1.0 })
            .unwrap();

        assert_eq!(p.tessellation, "township");
        assert_eq!(p.units[0].label, "T1: 1 of 2 wells dry (50.0%)");
        assert_eq!(p.units[1].label, "T2: 0 of 1 wells dry (0.0%)");
        assert_eq!(p.units[2].label, "T3: no active wells");
        assert_eq!(p.units[2].failure_pct, None);
        for u in &p.units {
            assert_eq!(u.dry + u.wet, u.active);
        }
        assert_eq!(p.total_active(), 3);
    }

    #[test]
    fn predict_is_idempotent() {
        let (pop, tess, raster) = setup();
        let sampled = pop.all().with_groundwater_sample(&raster, Sampling::Nearest).unwrap();
        let rule = WellFailureRule::new(1979);
        let params = PumpParams { d: 0.7, omega: 1.1 };

        let first = predict(&sampled, &tess, rule, params).unwrap();
        let second = predict(&sampled, &tess, rule, params).unwrap();

        assert_eq!(first, second);
    }
}
