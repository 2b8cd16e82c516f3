//! simplex_optimizer::builders — Nelder–Mead solver construction helpers.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring behind two small builders: one that expands a
//! single guess into a starting simplex, and one that applies crate-level
//! tolerances to the solver.
//!
//! Conventions
//! -----------
//! - The starting simplex is `θ₀` plus one vertex per coordinate, where
//!   coordinate `i` is scaled by `1 + initial_step` (or set to
//!   [`ZERO_COORD_STEP`] when `θ₀[i] == 0`). Vertices may be infeasible; the
//!   objective's `+inf` penalty pushes the simplex back.
//! - Iteration budget and timeout are runtime concerns applied by the runner.
use crate::optimization::{
    errors::OptResult,
    simplex_optimizer::{
        traits::SearchOptions,
        types::{Simplex, Theta, ZERO_COORD_STEP},
    },
};

/// Starting simplex around `theta0` (`n + 1` vertices for `n` coordinates).
pub fn initial_simplex(theta0: &Theta, initial_step: f64) -> Vec<Theta> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut vertex = theta0.clone();
        vertex[i] = if vertex[i] != 0.0 { (1.0 + initial_step) * vertex[i] } else { ZERO_COORD_STEP };
        vertices.push(vertex);
    }
    vertices
}

pub fn build_simplex(theta0: &Theta, opts: &SearchOptions) -> OptResult<Simplex> {
    let mut solver = Simplex::new(initial_simplex(theta0, opts.initial_step));
    if let Some(tol) = opts.tols.tol_sd {
        solver = solver.with_sd_tolerance(tol)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::simplex_optimizer::traits::Tolerances;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The starting simplex has one vertex per coordinate plus the guess, and
    // each extra vertex perturbs exactly one coordinate.
    //
    // Given
    // -----
    // - θ₀ = [0.8, 0.0], step 0.05.
    //
    // Expect
    // ------
    // - Vertices [0.8, 0.0], [0.84, 0.0], [0.8, ZERO_COORD_STEP].
    fn initial_simplex_perturbs_one_coordinate_per_vertex() {
        let vertices = initial_simplex(&array![0.8, 0.0], 0.05);

        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0], array![0.8, 0.0]);
        approx::assert_abs_diff_eq!(vertices[1][0], 0.84, epsilon = 1e-12);
        assert_eq!(vertices[1][1], 0.0);
        assert_eq!(vertices[2], array![0.8, ZERO_COORD_STEP]);
    }

    #[test]
    fn build_simplex_applies_tolerance() {
        let opts = SearchOptions {
            tols: Tolerances::new(Some(1e-8), Some(50)).unwrap(),
            ..SearchOptions::default()
        };

        assert!(build_simplex(&array![0.8, 1.2], &opts).is_ok());
    }
}
