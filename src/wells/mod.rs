//! wells — well registry, filter pipeline and the well-failure decision rule.
//!
//! Purpose
//! -------
//! Own everything that is evaluated *per well*: the immutable registry
//! ([`population::WellPopulation`]), the pure filter stages that narrow it to
//! the active, sampleable population, and the decision rule
//! ([`rule::WellFailureRule`]) shared by calibration and prediction.
//!
//! Conventions
//! -----------
//! - Depths are positive distances below land surface (land surface = 0).
//! - The active cutoff is `reference_year − retirement_age`.
//! - Model variants are specialisations of one rule through
//!   [`rule::ModelVariant::params`], never separate code paths.

pub mod errors;
pub mod population;
pub mod rule;

pub use self::errors::{WellError, WellResult};
pub use self::population::{SampledWells, Well, WellPopulation, WellSubset};
pub use self::rule::{ModelVariant, PumpParams, WellFailureRule, active_cutoff_year};
