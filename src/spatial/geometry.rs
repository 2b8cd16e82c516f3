//! spatial::geometry — points, rings and (multi-)polygons in projected space.
//!
//! Purpose
//! -------
//! Provide the minimal planar geometry the aggregator needs: validated
//! polygon rings with holes, multi-polygons for reporting units that are
//! split in several parts, and an axis-aligned bounding box used as a cheap
//! prefilter before the exact containment test.
//!
//! Key behaviors
//! -------------
//! - [`Ring::new`] validates vertices and drops an explicit closing vertex.
//! - Containment uses the crossing-number test with a half-open rule on
//!   edge endpoints (`yi > y` vs `yj > y`), so a point lying on an edge that
//!   two adjacent polygons share is inside exactly one of them.
//!
//! Invariants & assumptions
//! ------------------------
//! - Coordinates are planar and projected (metres or feet); no geodesic
//!   arithmetic is performed.
//! - Every ring has at least three vertices and all coordinates are finite.
//!
//! Testing notes
//! -------------
//! - Unit tests cover ring validation, holes, and shared-edge assignment.

use serde::{Deserialize, Serialize};

use crate::spatial::errors::{SpatialError, SpatialResult};

/// Planar point in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    fn of_points(points: &[Point]) -> BoundingBox {
        let mut bbox = BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for p in points {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        bbox
    }

    fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Closed polygon ring stored without the repeated closing vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<Point>,
    bbox: BoundingBox,
}

impl Ring {
    /// Build a validated ring.
    ///
    /// Errors
    /// ------
    /// - `SpatialError::NonFiniteVertex` for the first NaN/±inf vertex.
    /// - `SpatialError::DegenerateRing` when fewer than three vertices remain
    ///   after dropping an explicit closing vertex.
    pub fn new(mut vertices: Vec<Point>) -> SpatialResult<Self> {
        if let Some(index) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(SpatialError::NonFiniteVertex { index });
        }
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(SpatialError::DegenerateRing { vertices: vertices.len() });
        }
        let bbox = BoundingBox::of_points(&vertices);
        Ok(Ring { vertices, bbox })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Crossing-number containment with a half-open rule on edge endpoints.
    pub fn contains(&self, p: Point) -> bool {
        if !self.bbox.contains(p) {
            return false;
        }
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > p.y) != (vj.y > p.y) {
                let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// Polygon with one exterior ring and zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Polygon { exterior, holes }
    }

    /// Convenience constructor for a hole-free polygon.
    pub fn from_exterior(vertices: Vec<Point>) -> SpatialResult<Self> {
        Ok(Polygon { exterior: Ring::new(vertices)?, holes: Vec::new() })
    }

    pub fn contains(&self, p: Point) -> bool {
        self.exterior.contains(p) && !self.holes.iter().any(|h| h.contains(p))
    }
}

/// One or more polygons forming a single reporting-unit geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon {
    parts: Vec<Polygon>,
    bbox: BoundingBox,
}

impl MultiPolygon {
    pub fn new(parts: Vec<Polygon>) -> SpatialResult<Self> {
        let mut iter = parts.iter();
        let first = iter.next().ok_or(SpatialError::EmptyGeometry)?;
        let bbox = iter.fold(first.exterior.bbox, |acc, p| acc.union(&p.exterior.bbox));
        Ok(MultiPolygon { parts, bbox })
    }

    pub fn parts(&self) -> &[Polygon] {
        &self.parts
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn contains(&self, p: Point) -> bool {
        self.bbox.contains(p) && self.parts.iter().any(|part| part.contains(p))
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        let bbox = polygon.exterior.bbox;
        MultiPolygon { parts: vec![polygon], bbox }
    }
}

/// Axis-aligned square as a polygon; used by tests and synthetic grids.
pub fn square(min_x: f64, min_y: f64, side: f64) -> SpatialResult<Polygon> {
    Polygon::from_exterior(vec![
        Point::new(min_x, min_y),
        Point::new(min_x + side, min_y),
        Point::new(min_x + side, min_y + side),
        Point::new(min_x, min_y + side),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Ring validation (closing vertex, degenerate rings, non-finite input).
    // - Containment for plain polygons, holes and multi-polygons.
    // - Half-open assignment of points on an edge shared by two polygons.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // An explicitly closed ring drops its duplicate closing vertex.
    fn ring_new_drops_explicit_closing_vertex() {
        let ring = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ])
        .unwrap();

        assert_eq!(ring.vertices().len(), 3);
    }

    #[test]
    fn ring_new_rejects_degenerate_and_non_finite_rings() {
        let two = Ring::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        let nan = Ring::new(vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 0.0),
            Point::new(1.0, 1.0),
        ]);

        assert_eq!(two.unwrap_err(), SpatialError::DegenerateRing { vertices: 2 });
        assert_eq!(nan.unwrap_err(), SpatialError::NonFiniteVertex { index: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Points inside a hole are not contained by the polygon.
    //
    // Given
    // -----
    // - A 10 x 10 square with a 2 x 2 hole at (4, 4).
    //
    // Expect
    // ------
    // - (1, 1) inside, (5, 5) outside, (11, 5) outside.
    fn polygon_contains_respects_holes() {
        let hole = Ring::new(square(4.0, 4.0, 2.0).unwrap().exterior.vertices().to_vec()).unwrap();
        let poly = Polygon::new(square(0.0, 0.0, 10.0).unwrap().exterior, vec![hole]);

        assert!(poly.contains(Point::new(1.0, 1.0)));
        assert!(!poly.contains(Point::new(5.0, 5.0)));
        assert!(!poly.contains(Point::new(11.0, 5.0)));
    }

    #[test]
    // Purpose
    // -------
    // A point on the edge shared by two adjacent squares is contained by
    // exactly one of them.
    fn shared_edge_point_is_inside_exactly_one_polygon() {
        let left = square(0.0, 0.0, 1.0).unwrap();
        let right = square(1.0, 0.0, 1.0).unwrap();
        let on_edge = Point::new(1.0, 0.5);

        let hits = [left.contains(on_edge), right.contains(on_edge)];

        assert_eq!(hits.iter().filter(|&&h| h).count(), 1);
    }

    #[test]
    fn multipolygon_contains_any_part_and_rejects_empty() {
        let mp = MultiPolygon::new(vec![square(0.0, 0.0, 1.0).unwrap(), square(5.0, 5.0, 1.0).unwrap()])
            .unwrap();

        assert!(mp.contains(Point::new(5.5, 5.5)));
        assert!(!mp.contains(Point::new(3.0, 3.0)));
        assert_eq!(MultiPolygon::new(vec![]).unwrap_err(), SpatialError::EmptyGeometry);
    }
}
