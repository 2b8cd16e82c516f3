//! calibration::bias_filter — two-stage reporting-bias filter.
//!
//! Purpose
//! -------
//! Select the fine reporting units whose observed failure ratios are trusted
//! enough to calibrate against. Self-reported failures are biased two ways:
//! some units over- or under-report failures, and units with few recent
//! wells produce noisy ratios. Each stage removes one of those effects.
//!
//! Key behaviors
//! -------------
//! 1. Units with no active wells are excluded first and counted as
//!    data-quality exclusions (their ratio is undefined, never zero).
//! 2. Failure-ratio stage: keep units whose ratio lies in `[p_lo, p_hi]`
//!    (defaults: 25th and 75th percentiles) of the remaining ratios.
//! 3. Completion-count stage: over the survivors, keep units whose active
//!    count lies in `[p_count, max]` (default 25th percentile).
//! 4. Denylist: drop units by identifier.
//!
//! Invariants & assumptions
//! ------------------------
//! - Quantiles use linear interpolation between order statistics; both
//!   bounds are inclusive.
//! - Every retained ratio lies in the stage-1 interval, so ratios above 1
//!   survive only if the interquartile range itself exceeds 1.
//! - Target order follows unit order in the tessellation.
//!
//! Testing notes
//! -------------
//! - Unit tests cover zero-active exclusion, the two quantile stages on a
//!   hand-computed example, denylisting and the empty-result error.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::calibration::{
    errors::{CalibError, CalibResult},
    pipeline::ObservedUnits,
    quantile::quantile,
};

/// Quantile levels and the identifier denylist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub ratio_lower_q: f64,
    pub ratio_upper_q: f64,
    pub count_lower_q: f64,
    pub denylist: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings { ratio_lower_q: 0.25, ratio_upper_q: 0.75, count_lower_q: 0.25, denylist: vec![] }
    }
}

impl FilterSettings {
    pub fn validate(&self) -> CalibResult<()> {
        for (field, q) in [
            ("filter.ratio_lower_q", self.ratio_lower_q),
            ("filter.ratio_upper_q", self.ratio_upper_q),
            ("filter.count_lower_q", self.count_lower_q),
        ] {
            if !(0.0..=1.0).contains(&q) {
                return Err(CalibError::InvalidConfig { field, reason: "quantile must lie in [0, 1]" });
            }
        }
        if self.ratio_lower_q > self.ratio_upper_q {
            return Err(CalibError::InvalidConfig {
                field: "filter.ratio_lower_q",
                reason: "lower ratio quantile exceeds upper ratio quantile",
            });
        }
        Ok(())
    }
}

/// One retained unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTarget {
    /// Index into the fine tessellation.
    pub unit: usize,
    pub id: String,
    pub observed_ratio: f64,
    pub dry: u64,
    pub active: u64,
}

/// Interval bounds applied by each stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterThresholds {
    pub ratio_low: f64,
    pub ratio_high: f64,
    pub count_low: f64,
    pub count_high: f64,
}

/// Number of units removed at each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub candidates: usize,
    pub zero_active: usize,
    pub ratio_stage: usize,
    pub count_stage: usize,
    pub denylisted: usize,
}

/// Ordered calibration targets with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTargetSet {
    targets: Vec<CalibrationTarget>,
    pub thresholds: FilterThresholds,
    pub report: FilterReport,
}

impl CalibrationTargetSet {
    pub fn targets(&self) -> &[CalibrationTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Observed ratios in target order.
    pub fn observed(&self) -> Vec<f64> {
        self.targets.iter().map(|t| t.observed_ratio).collect()
    }

    /// Fine-tessellation unit indices in target order.
    pub fn units(&self) -> Vec<usize> {
        self.targets.iter().map(|t| t.unit).collect()
    }
}

/// Run the two-stage filter plus denylist over `observed`.
///
/// Errors
/// ------
/// - `CalibError::EmptyTargetSet` if no unit has active wells or every unit
///   is removed.
/// - `CalibError::InvalidQuantile` for out-of-range quantile settings.
pub fn select_targets(
    observed: &ObservedUnits, settings: &FilterSettings,
) -> CalibResult<CalibrationTargetSet> {
    let mut report = FilterReport { candidates: observed.len(), ..FilterReport::default() };

    let with_wells: Vec<(usize, f64)> = (0..observed.len())
        .filter_map(|i| observed.ratio(i).map(|r| (i, r)))
        .filter(|(_, r)| r.is_finite() && *r >= 0.0)
        .collect();
    report.zero_active = observed.len() - with_wells.len();
    if with_wells.is_empty() {
        return Err(CalibError::EmptyTargetSet);
    }

    let ratios: Vec<f64> = with_wells.iter().map(|(_, r)| *r).collect();
    let ratio_low = quantile(&ratios, settings.ratio_lower_q, "failure ratios")?;
    let ratio_high = quantile(&ratios, settings.ratio_upper_q, "failure ratios")?;
    let ratio_kept: Vec<(usize, f64)> =
        with_wells.into_iter().filter(|(_, r)| *r >= ratio_low && *r <= ratio_high).collect();
    report.ratio_stage = ratios.len() - ratio_kept.len();
    if ratio_kept.is_empty() {
        return Err(CalibError::EmptyTargetSet);
    }

    let counts: Vec<f64> = ratio_kept.iter().map(|(i, _)| observed.active()[*i] as f64).collect();
    let count_low = quantile(&counts, settings.count_lower_q, "active well counts")?;
    let count_high = quantile(&counts, 1.0, "active well counts")?;
    let count_kept: Vec<(usize, f64)> = ratio_kept
        .into_iter()
        .filter(|(i, _)| {
            let c = observed.active()[*i] as f64;
            c >= count_low && c <= count_high
        })
        .collect();
    report.count_stage = counts.len() - count_kept.len();

    let denied: HashSet<&str> = settings.denylist.iter().map(String::as_str).collect();
    let before_deny = count_kept.len();
    let targets: Vec<CalibrationTarget> = count_kept
        .into_iter()
        .filter(|(i, _)| !denied.contains(observed.ids()[*i].as_str()))
        .map(|(i, r)| CalibrationTarget {
            unit: i,
            id: observed.ids()[i].clone(),
            observed_ratio: r,
            dry: observed.dry()[i],
            active: observed.active()[i],
        })
        .collect();
    report.denylisted = before_deny - targets.len();

    let thresholds = FilterThresholds { ratio_low, ratio_high, count_low, count_high };
    log::info!(
        "bias filter: ratio in [{ratio_low:.4}, {ratio_high:.4}], active count in [{count_low:.1}, {count_high:.0}]; \
         {} of {} units retained ({} without active wells, {} by ratio, {} by count, {} denylisted)",
        targets.len(),
        report.candidates,
        report.zero_active,
        report.ratio_stage,
        report.count_stage,
        report.denylisted
    );
    if targets.is_empty() {
        return Err(CalibError::EmptyTargetSet);
    }
    Ok(CalibrationTargetSet { targets, thresholds, report })
}
