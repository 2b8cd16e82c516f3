//! calibration::pipeline — end-to-end calibration and prediction run.
//!
//! Purpose
//! -------
//! Orchestrate the engine over immutable inputs:
//!
//! 1. filter the well registry down to the active, sampleable population,
//! 2. aggregate active wells and observed failures onto the fine
//!    tessellation ([`ObservedUnits`]),
//! 3. select calibration targets with the bias filter,
//! 4. solve the ω bounds from the raster series,
//! 5. fit the null, single- and double-parameter models
//!    ([`ModelComparison`]),
//! 6. apply the lowest-SSE parameters at the fine, medium and coarse scales.
//!
//! Key behaviors
//! -------------
//! - Each stage logs its outcome at `info`; dropped records are reported at
//!   `warn` by the spatial joins themselves.
//! - A fit that stops on its iteration budget or timeout fails the run with
//!   `CalibError::NotConverged` carrying the best state reached.
//! - The well-to-unit assignment on the fine tessellation is computed once
//!   and shared by every objective evaluation of every variant.
//!
//! Conventions
//! -----------
//! - Observed active counts come from the registry (active wells with a
//!   valid, non-negative water column), independent of raster coverage.
//! - Model selection prefers the simpler model on equal SSE.

use crate::{
    calibration::{
        bias_filter::{CalibrationTargetSet, select_targets},
        bounds::{OmegaBounds, solve_omega_bounds},
        errors::{CalibError, CalibResult},
        objective::CalibrationProblem,
        prediction::{TessellationPrediction, predict},
    },
    config::CalibrationConfig,
    optimization::simplex_optimizer::{Theta, minimize, minimize_multistart},
    spatial::{
        aggregate::{Tessellation, UnitAssignment, count_points},
        crs::Crs,
        geometry::Point,
        raster::RasterSeries,
    },
    wells::{
        population::{SampledWells, WellPopulation},
        rule::{ModelVariant, PumpParams, WellFailureRule},
    },
};

/// Observed dry and active counts per unit of one tessellation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedUnits {
    ids: Vec<String>,
    dry: Vec<u64>,
    active: Vec<u64>,
}

impl ObservedUnits {
    /// Errors
    /// ------
    /// - `CalibError::UnitCountMismatch` when the three vectors differ in
    ///   length.
    pub fn new(ids: Vec<String>, dry: Vec<u64>, active: Vec<u64>) -> CalibResult<Self> {
        for found in [dry.len(), active.len()] {
            if found != ids.len() {
                return Err(CalibError::UnitCountMismatch { expected: ids.len(), found });
            }
        }
        Ok(ObservedUnits { ids, dry, active })
    }

    /// Count active wells and reported failures inside each unit.
    pub fn from_points(
        tessellation: &Tessellation, active_wells: &[Point], wells_crs: Crs, failures: &[Point],
        failures_crs: Crs,
    ) -> CalibResult<Self> {
        let active = count_points(active_wells, wells_crs, tessellation)?;
        let dry = count_points(failures, failures_crs, tessellation)?;
        log::info!(
            "observed counts on '{}': {} active wells ({} outside), {} reported failures ({} outside)",
            tessellation.name,
            active.counts.iter().sum::<u64>(),
            active.dropped,
            dry.counts.iter().sum::<u64>(),
            dry.dropped
        );
        let ids = tessellation.units.iter().map(|u| u.id.clone()).collect();
        Self::new(ids, dry.counts, active.counts)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn dry(&self) -> &[u64] {
        &self.dry
    }

    pub fn active(&self) -> &[u64] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Raw observed ratio `dry / active`; `None` when the unit has no active
    /// wells. Not clamped: values above 1 are possible.
    pub fn ratio(&self, i: usize) -> Option<f64> {
        match self.active[i] {
            0 => None,
            n => Some(self.dry[i] as f64 / n as f64),
        }
    }
}

/// Fitted parameters and score of one model variant.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    pub variant: ModelVariant,
    pub params: PumpParams,
    pub sse: f64,
    pub iterations: usize,
    pub converged: bool,
    pub status: String,
}

/// One row per model variant, in [`ModelVariant::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelComparison {
    pub rows: Vec<FittedModel>,
}

impl ModelComparison {
    pub fn row(&self, variant: ModelVariant) -> Option<&FittedModel> {
        self.rows.iter().find(|r| r.variant == variant)
    }

    /// Lowest-SSE row; the earlier (simpler) variant wins ties.
    pub fn best(&self) -> Option<&FittedModel> {
        let mut best: Option<&FittedModel> = None;
        for row in &self.rows {
            if best.map_or(true, |b| row.sse < b.sse) {
                best = Some(row);
            }
        }
        best
    }
}

/// Predictions at the three reporting scales.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalePredictions {
    pub fine: TessellationPrediction,
    pub medium: TessellationPrediction,
    pub coarse: TessellationPrediction,
}

/// Record counts through the filter pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationAudit {
    pub registry: usize,
    pub valid_year: usize,
    pub non_negative_column: usize,
    pub active: usize,
    pub outside_raster: usize,
    pub outside_fine_units: usize,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub cutoff_year: i32,
    pub audit: PopulationAudit,
    pub targets: CalibrationTargetSet,
    pub bounds: OmegaBounds,
    pub comparison: ModelComparison,
    pub selected: FittedModel,
    pub predictions: ScalePredictions,
}

/// Immutable inputs of one run.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationInputs<'a> {
    pub wells: &'a WellPopulation,
    pub failures: &'a [Point],
    pub failures_crs: Crs,
    pub groundwater: &'a RasterSeries,
    pub fine: &'a Tessellation,
    pub medium: &'a Tessellation,
    pub coarse: &'a Tessellation,
}

/// Runs the calibration engine under one validated configuration.
#[derive(Debug, Clone)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    pub fn new(config: CalibrationConfig) -> CalibResult<Self> {
        config.validate()?;
        Ok(Calibrator { config })
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn rule(&self) -> WellFailureRule {
        WellFailureRule::new(self.config.active_cutoff_year())
    }

    /// Fit one variant against `targets`.
    ///
    /// The null model has no free parameters and is scored directly; its row
    /// reports `PumpParams { d: 1.0, omega: 1.0 }`. The other variants start
    /// from the configured guess (plus any extra starts) and must converge.
    ///
    /// Errors
    /// ------
    /// - `CalibError::InfeasibleStart` when the configured guess violates the
    ///   bounds.
    /// - `CalibError::NotConverged` when the budget or timeout is exhausted.
    pub fn fit_variant(
        &self, variant: ModelVariant, wells: &SampledWells<'_>, assignment: &UnitAssignment,
        targets: &CalibrationTargetSet, bounds: &OmegaBounds,
    ) -> CalibResult<FittedModel> {
        let problem =
            CalibrationProblem::new(wells, assignment, targets, self.rule(), variant, bounds);
        if variant.n_free() == 0 {
            let params = variant.params(&[])?;
            return Ok(FittedModel {
                variant,
                params,
                sse: problem.sse_at(params)?,
                iterations: 0,
                converged: true,
                status: "No free parameters".to_string(),
            });
        }

        let settings = &self.config.optimizer;
        let guess = settings.initial_guess;
        if !problem.is_feasible(variant.params(&variant.theta(guess))?) {
            return Err(CalibError::InfeasibleStart { variant, theta: variant.theta(guess) });
        }
        let opts = settings.search_options()?;
        let outcome = if settings.extra_starts.is_empty() {
            minimize(&problem, Theta::from(variant.theta(guess)), &opts)?
        } else {
            let starts: Vec<Theta> = std::iter::once(guess)
                .chain(settings.extra_starts.iter().copied())
                .map(|p| Theta::from(variant.theta(p)))
                .collect();
            minimize_multistart(&problem, &starts, &opts)?
        };
        if !outcome.converged {
            return Err(CalibError::NotConverged { variant, best: Box::new(outcome) });
        }
        let params = variant.params(&outcome.theta_hat.to_vec())?;
        log::debug!(
            "{variant} model: {} iterations, status {}, d = {:.4}, omega = {:.4}, sse = {:.6}",
            outcome.iterations,
            outcome.status,
            params.d,
            params.omega,
            outcome.value
        );
        Ok(FittedModel {
            variant,
            params,
            sse: outcome.value,
            iterations: outcome.iterations,
            converged: outcome.converged,
            status: outcome.status,
        })
    }

    /// Execute the full pipeline.
    pub fn run(&self, inputs: &CalibrationInputs<'_>) -> CalibResult<CalibrationReport> {
        let cutoff_year = self.config.active_cutoff_year();
        let rule = self.rule();

        let all = inputs.wells.all();
        let dated = all.with_valid_year();
        let wet = dated.with_non_negative_column();
        let active = wet.active(cutoff_year);
        log::info!(
            "well registry: {} records, {} dated, {} with non-negative column, {} active since {cutoff_year}",
            all.len(),
            dated.len(),
            wet.len(),
            active.len()
        );

        let observed = ObservedUnits::from_points(
            inputs.fine,
            &active.locations(),
            inputs.wells.crs(),
            inputs.failures,
            inputs.failures_crs,
        )?;
        let targets = select_targets(&observed, &self.config.filter)?;

        let mean = inputs.groundwater.cell_mean();
        let sampled = active.with_groundwater_sample(&mean, self.config.sampling)?;
        let assignment = UnitAssignment::assign(&sampled.locations(), sampled.crs(), inputs.fine)?;

        let bounds = solve_omega_bounds(inputs.groundwater, &self.config.bounds)?;

        let rows = ModelVariant::ALL
            .iter()
            .map(|&variant| self.fit_variant(variant, &sampled, &assignment, &targets, &bounds))
            .collect::<CalibResult<Vec<_>>>()?;
        let comparison = ModelComparison { rows };
        for row in &comparison.rows {
            log::info!(
                "{} model: d = {:.4}, omega = {:.4}, sse = {:.6}",
                row.variant,
                row.params.d,
                row.params.omega,
                row.sse
            );
        }
        let selected = comparison.best().cloned().ok_or(CalibError::EmptyTargetSet)?;
        log::info!("selected the {} model for prediction", selected.variant);

        let predictions = ScalePredictions {
            fine: predict(&sampled, inputs.fine, rule, selected.params)?,
            medium: predict(&sampled, inputs.medium, rule, selected.params)?,
            coarse: predict(&sampled, inputs.coarse, rule, selected.params)?,
        };

        let audit = PopulationAudit {
            registry: all.len(),
            valid_year: dated.len(),
            non_negative_column: wet.len(),
            active: active.len(),
            outside_raster: sampled.dropped(),
            outside_fine_units: assignment.dropped(),
        };
        Ok(CalibrationReport {
            cutoff_year,
            audit,
            targets,
            bounds,
            comparison,
            selected,
            predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(variant: ModelVariant, sse: f64) -> FittedModel {
        FittedModel {
            variant,
            params: PumpParams { d: 0.5, omega: 1.0 },
            sse,
            iterations: 0,
            converged: true,
            status: String::new(),
        }
    }

    #[test]
    fn observed_units_ratio_is_undefined_without_wells() {
        let obs = ObservedUnits::new(vec!["a".into(), "b".into()], vec![3, 1], vec![2, 0]).unwrap();

        assert_eq!(obs.ratio(0), Some(1.5));
        assert_eq!(obs.ratio(1), None);
        assert_eq!(
            ObservedUnits::new(vec!["a".into()], vec![1, 2], vec![1]).unwrap_err(),
            CalibError::UnitCountMismatch { expected: 1, found: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // The lowest SSE wins and ties go to the simpler model.
    fn model_comparison_best_prefers_simpler_on_ties() {
        let cmp = ModelComparison {
            rows: vec![
                row(ModelVariant::Null, 0.3),
                row(ModelVariant::SingleParameter, 0.1),
                row(ModelVariant::DoubleParameter, 0.1),
            ],
        };

        assert_eq!(cmp.best().unwrap().variant, ModelVariant::SingleParameter);
        assert_eq!(cmp.row(ModelVariant::Null).unwrap().sse, 0.3);
    }

    #[test]
    fn calibrator_rejects_invalid_config() {
        let mut config = CalibrationConfig::default();
        config.retirement_age = -1;

        assert!(matches!(Calibrator::new(config), Err(CalibError::InvalidConfig { .. })));
    }
}
