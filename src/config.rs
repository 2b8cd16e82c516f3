//! config — versioned calibration configuration.
//!
//! Every constant the engine depends on (reference year, retirement age,
//! filter quantiles, denylist, ω grid, sampling method, optimizer budget)
//! lives in one serde structure that can be loaded from JSON. Missing fields
//! fall back to the defaults (reference year 2012, retirement age 33), so
//! `{}` is a valid configuration.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    calibration::{
        bias_filter::FilterSettings,
        bounds::OmegaGrid,
        errors::{CalibError, CalibResult},
    },
    optimization::simplex_optimizer::{DEFAULT_RELATIVE_STEP, SearchOptions, Tolerances},
    spatial::raster::Sampling,
    wells::rule::{PumpParams, active_cutoff_year},
};

/// Configuration schema understood by this crate.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub schema_version: u32,
    pub reference_year: i32,
    pub retirement_age: i32,
    pub sampling: Sampling,
    pub filter: FilterSettings,
    pub bounds: OmegaGrid,
    pub optimizer: OptimizerSettings,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            schema_version: SCHEMA_VERSION,
            reference_year: 2012,
            retirement_age: 33,
            sampling: Sampling::default(),
            filter: FilterSettings::default(),
            bounds: OmegaGrid::default(),
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl CalibrationConfig {
    pub fn from_json_str(text: &str) -> CalibResult<Self> {
        let config: CalibrationConfig =
            serde_json::from_str(text).map_err(|e| CalibError::ConfigParse { text: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> CalibResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CalibError::ConfigIo { text: format!("{}: {e}", path.display()) })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> CalibResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CalibError::ConfigParse { text: e.to_string() })
    }

    /// First completion year counted as active.
    pub fn active_cutoff_year(&self) -> i32 {
        active_cutoff_year(self.reference_year, self.retirement_age)
    }

    pub fn validate(&self) -> CalibResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(CalibError::UnsupportedSchema {
                found: self.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        if self.retirement_age < 0 {
            return Err(CalibError::InvalidConfig {
                field: "retirement_age",
                reason: "must be non-negative",
            });
        }
        self.filter.validate()?;
        self.bounds.validate()?;
        self.optimizer.validate()
    }
}

/// Nelder–Mead settings shared by the single- and double-parameter fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub initial_guess: PumpParams,
    /// Additional starting points run in parallel with the initial guess.
    pub extra_starts: Vec<PumpParams>,
    pub max_iter: usize,
    pub sd_tolerance: f64,
    pub initial_step: f64,
    pub timeout_secs: Option<f64>,
    pub verbose: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            initial_guess: PumpParams { d: 0.8, omega: 1.2 },
            extra_starts: vec![],
            max_iter: 400,
            sd_tolerance: 1e-6,
            initial_step: DEFAULT_RELATIVE_STEP,
            timeout_secs: None,
            verbose: false,
        }
    }
}

impl OptimizerSettings {
    pub fn validate(&self) -> CalibResult<()> {
        for p in std::iter::once(&self.initial_guess).chain(&self.extra_starts) {
            if !p.d.is_finite() || !p.omega.is_finite() {
                return Err(CalibError::InvalidConfig {
                    field: "optimizer.initial_guess",
                    reason: "starting points must be finite",
                });
            }
        }
        if let Some(t) = self.timeout_secs {
            if !t.is_finite() || t <= 0.0 {
                return Err(CalibError::InvalidConfig {
                    field: "optimizer.timeout_secs",
                    reason: "must be finite and positive",
                });
            }
        }
        self.search_options().map(|_| ())
    }

    pub fn search_options(&self) -> CalibResult<SearchOptions> {
        let tols = Tolerances::new(Some(self.sd_tolerance), Some(self.max_iter))?;
        let timeout = self.timeout_secs.filter(|t| t.is_finite() && *t > 0.0).map(Duration::from_secs_f64);
        Ok(SearchOptions::new(tols, self.initial_step, timeout, self.verbose)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;

    #[test]
    fn defaults_give_1979_cutoff_and_bilinear_sampling() {
        let c = CalibrationConfig::default();

        assert_eq!(c.active_cutoff_year(), 1979);
        assert_eq!(c.sampling, Sampling::Bilinear);
        assert_eq!(c.optimizer.initial_guess, PumpParams { d: 0.8, omega: 1.2 });
        assert_eq!(c.bounds.candidates().len(), 200);
        assert!(c.validate().is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Partial JSON fills the remaining fields with defaults.
    fn from_json_str_merges_with_defaults() {
        let c = CalibrationConfig::from_json_str(
            r#"{"retirement_age": 30, "sampling": "nearest", "filter": {"denylist": ["T12"]}}"#,
        )
        .unwrap();

        assert_eq!(c.retirement_age, 30);
        assert_eq!(c.reference_year, 2012);
        assert_eq!(c.sampling, Sampling::Nearest);
        assert_eq!(c.filter.denylist, vec!["T12".to_string()]);
        assert_eq!(c.filter.ratio_lower_q, 0.25);
        assert_eq!(CalibrationConfig::from_json_str("{}").unwrap(), CalibrationConfig::default());
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let mut c = CalibrationConfig::default();
        c.optimizer.timeout_secs = Some(2.5);

        let back = CalibrationConfig::from_json_str(&c.to_json_string().unwrap()).unwrap();

        assert_eq!(back, c);
    }

    #[test]
    fn validate_rejects_inconsistent_values() {
        assert_eq!(
            CalibrationConfig::from_json_str(r#"{"schema_version": 7}"#).unwrap_err(),
            CalibError::UnsupportedSchema { found: 7, supported: SCHEMA_VERSION }
        );
        assert!(matches!(
            CalibrationConfig::from_json_str(r#"{"optimizer": {"max_iter": 0}}"#),
            Err(CalibError::Opt(OptError::InvalidMaxIter { .. }))
        ));
        assert!(matches!(
            CalibrationConfig::from_json_str(r#"{"optimizer": {"timeout_secs": -1.0}}"#),
            Err(CalibError::InvalidConfig { field: "optimizer.timeout_secs", .. })
        ));
        assert!(matches!(
            CalibrationConfig::from_json_str(r#"{"bounds": {"step": -0.01}}"#),
            Err(CalibError::InvalidGrid { .. })
        ));
        assert!(matches!(CalibrationConfig::from_json_str("not json"), Err(CalibError::ConfigParse { .. })));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let missing = std::env::temp_dir().join("well_failure_missing_config.json");

        assert!(matches!(CalibrationConfig::from_path(missing), Err(CalibError::ConfigIo { .. })));
    }
}
