//! Adapter that exposes a user [`Objective`] as an `argmin` problem.
//!
//! The cost is passed through unchanged. `+inf` is forwarded so the simplex
//! treats infeasible vertices as worst; NaN and `-inf` are rejected because
//! they would break the vertex ordering.
use crate::optimization::simplex_optimizer::{
    traits::Objective,
    types::{Cost, Theta},
    validation::validate_cost,
};
use argmin::core::{CostFunction, Error};

/// Bridges a user [`Objective`] to `argmin`'s `CostFunction`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// # Errors
    /// Propagates any `OptError` from the user's `cost`, and
    /// `OptError::InvalidCost` for NaN / `-inf`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.cost(theta)?;
        Ok(validate_cost(output)?)
    }
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F) -> Self {
        Self { f }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::{OptError, OptResult};
    use ndarray::array;

    struct Fixed(f64);

    impl Objective for Fixed {
        fn cost(&self, _theta: &Theta) -> OptResult<Cost> {
            Ok(self.0)
        }
        fn check(&self, _theta: &Theta) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    fn adapter_forwards_finite_and_penalty_costs() {
        assert_eq!(ArgMinAdapter::new(&Fixed(1.5)).cost(&array![0.0]).unwrap(), 1.5);
        assert_eq!(ArgMinAdapter::new(&Fixed(f64::INFINITY)).cost(&array![0.0]).unwrap(), f64::INFINITY);
    }

    #[test]
    fn adapter_rejects_nan_cost() {
        let err = ArgMinAdapter::new(&Fixed(f64::NAN)).cost(&array![0.0]).unwrap_err();

        assert!(matches!(OptError::from(err), OptError::InvalidCost { .. }));
    }
}
