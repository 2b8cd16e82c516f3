//! Coordinate reference identity carried by every spatial type.
//!
//! Re-projection is out of scope; the crate only needs to know *which*
//! reference a coordinate pair lives in so that joins between wells,
//! rasters and polygons can fail fast instead of silently mis-joining.

use serde::{Deserialize, Serialize};

use crate::spatial::errors::{SpatialError, SpatialResult};

/// Opaque coordinate-reference identifier (an EPSG code).
///
/// Projected California Albers (`EPSG:3310`) is the reference used by the
/// Central Valley datasets, but any code is accepted; only equality matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(u32);

impl Crs {
    /// California Albers, NAD83 (`EPSG:3310`).
    pub const CA_ALBERS: Crs = Crs(3310);

    pub const fn epsg(code: u32) -> Self {
        Crs(code)
    }

    pub const fn code(&self) -> u32 {
        self.0
    }

    /// Fail with [`SpatialError::CrsMismatch`] unless `other == self`.
    pub fn ensure_same(&self, other: Crs, context: &'static str) -> SpatialResult<()> {
        if *self != other {
            return Err(SpatialError::CrsMismatch { expected: *self, found: other, context });
        }
        Ok(())
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_same_accepts_equal_and_rejects_different_codes() {
        let albers = Crs::CA_ALBERS;

        assert!(albers.ensure_same(Crs::epsg(3310), "test").is_ok());
        assert_eq!(
            albers.ensure_same(Crs::epsg(4269), "test").unwrap_err(),
            SpatialError::CrsMismatch { expected: albers, found: Crs::epsg(4269), context: "test" }
        );
    }
}
