//! spatial::aggregate — point-in-polygon counting over reporting units.
//!
//! Purpose
//! -------
//! Count point features (wells, reported failures) falling inside each
//! reporting unit of a tessellation. This is the single primitive reused by
//! the observed-ratio computation, every objective evaluation and the final
//! prediction pass.
//!
//! Key behaviors
//! -------------
//! - [`UnitAssignment::assign`] resolves, once, which unit each point falls
//!   in. Later counts only read this assignment, so dry and wet counts taken
//!   from the same assignment always partition the unit's active wells.
//! - A point on a boundary shared by two units is assigned to the first unit
//!   (in tessellation order) whose containment test accepts it.
//! - Points inside no unit are dropped and counted in
//!   [`UnitAssignment::dropped`]; they are never folded into a neighbour.
//!
//! Invariants & assumptions
//! ------------------------
//! - Points and tessellation share one [`Crs`]; a mismatch fails fast.
//! - `counts.len() == tessellation.len()` and is ordered like the units.
//! - Units without points report `0`.

use crate::spatial::{
    crs::Crs,
    errors::SpatialResult,
    geometry::{MultiPolygon, Point},
};

/// A single administrative or hydrologic polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportingUnit {
    pub id: String,
    pub geometry: MultiPolygon,
}

impl ReportingUnit {
    pub fn new(id: impl Into<String>, geometry: impl Into<MultiPolygon>) -> Self {
        ReportingUnit { id: id.into(), geometry: geometry.into() }
    }
}

/// Ordered set of reporting units sharing one coordinate reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Tessellation {
    pub name: String,
    pub crs: Crs,
    pub units: Vec<ReportingUnit>,
}

impl Tessellation {
    pub fn new(name: impl Into<String>, crs: Crs, units: Vec<ReportingUnit>) -> Self {
        Tessellation { name: name.into(), crs, units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Index of the first unit containing `p`, if any.
    pub fn locate(&self, p: Point) -> Option<usize> {
        self.units.iter().position(|u| u.geometry.contains(p))
    }
}

/// Per-point unit membership for one tessellation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitAssignment {
    unit_of: Vec<Option<usize>>,
    n_units: usize,
    dropped: usize,
}

impl UnitAssignment {
    /// Resolve the containing unit of every point.
    ///
    /// Errors
    /// ------
    /// - `SpatialError::CrsMismatch` if `points_crs != tessellation.crs`.
    pub fn assign(
        points: &[Point], points_crs: Crs, tessellation: &Tessellation,
    ) -> SpatialResult<Self> {
        tessellation.crs.ensure_same(points_crs, "point/tessellation join")?;
        let unit_of: Vec<Option<usize>> = points.iter().map(|&p| tessellation.locate(p)).collect();
        let dropped = unit_of.iter().filter(|u| u.is_none()).count();
        if dropped > 0 {
            log::warn!(
                "{dropped} of {} points fall outside every unit of '{}' and were dropped",
                points.len(),
                tessellation.name
            );
        }
        Ok(UnitAssignment { unit_of, n_units: tessellation.len(), dropped })
    }

    /// Unit index of point `i` (`None` when the point was dropped).
    pub fn unit_of(&self, i: usize) -> Option<usize> {
        self.unit_of.get(i).copied().flatten()
    }

    pub fn n_points(&self) -> usize {
        self.unit_of.len()
    }

    pub fn n_units(&self) -> usize {
        self.n_units
    }

    /// Number of points located in no unit.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Points per unit, in unit order.
    pub fn counts(&self) -> Vec<u64> {
        self.counts_where(|_| true)
    }

    /// Points per unit restricted to those for which `keep(i)` holds.
    pub fn counts_where<F: Fn(usize) -> bool>(&self, keep: F) -> Vec<u64> {
        let mut counts = vec![0u64; self.n_units];
        for (i, unit) in self.unit_of.iter().enumerate() {
            if let Some(u) = unit {
                if keep(i) {
                    counts[*u] += 1;
                }
            }
        }
        counts
    }
}

/// Per-unit counts plus the number of points dropped by the join.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCounts {
    pub counts: Vec<u64>,
    pub dropped: usize,
}

/// Count `points` falling inside each unit of `tessellation`.
///
/// One-shot form of [`UnitAssignment::assign`] followed by
/// [`UnitAssignment::counts`].
pub fn count_points(
    points: &[Point], points_crs: Crs, tessellation: &Tessellation,
) -> SpatialResult<UnitCounts> {
    let assignment = UnitAssignment::assign(points, points_crs, tessellation)?;
    Ok(UnitCounts { counts: assignment.counts(), dropped: assignment.dropped() })
}
