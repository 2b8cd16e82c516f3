//! Validation helpers for simplex optimization.
//!
//! This module centralizes the consistency checks used across the optimizer
//! interface:
//!
//! - **Option checks**: [`verify_tol_sd`], [`verify_max_iter`],
//!   [`verify_initial_step`] ensure stopping rules and simplex steps are
//!   finite and strictly positive when provided.
//! - **Initial guesses**: [`validate_theta0`] requires a non-empty, finite
//!   starting vector.
//! - **Costs**: [`validate_cost`] accepts finite values and the `+inf`
//!   penalty, rejecting NaN and `-inf`; [`validate_value`] requires the final
//!   best cost to be finite.
//! - **Parameter estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
use crate::optimization::{
    errors::{OptError, OptResult},
    simplex_optimizer::types::{Cost, Theta},
};

pub fn verify_tol_sd(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolSd { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolSd { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

pub fn verify_max_iter(max_iter: Option<usize>) -> OptResult<()> {
    if max_iter == Some(0) {
        return Err(OptError::InvalidMaxIter {
            max_iter: 0,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

pub fn verify_initial_step(step: f64) -> OptResult<()> {
    if !step.is_finite() {
        return Err(OptError::InvalidInitialStep { step, reason: "Step must be finite." });
    }
    if step <= 0.0 {
        return Err(OptError::InvalidInitialStep { step, reason: "Step must be positive." });
    }
    Ok(())
}

pub fn validate_theta0(theta0: &Theta) -> OptResult<()> {
    if theta0.is_empty() {
        return Err(OptError::EmptyTheta);
    }
    for (index, &value) in theta0.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidThetaInput { index, value });
        }
    }
    Ok(())
}

pub fn validate_cost(value: Cost) -> OptResult<Cost> {
    if value.is_nan() || value == f64::NEG_INFINITY {
        return Err(OptError::InvalidCost { value });
    }
    Ok(value)
}

pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
