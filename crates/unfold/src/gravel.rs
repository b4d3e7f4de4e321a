//! Gravel unfolding, a generalised SAND-II iterative method
//!
//! Every iteration multiplies each bin by a correction coefficient
//!
//! ```text
//! a_ij   = R_ij f_j / N0_i
//! w_i    = N_i^2 / sigma2_i
//! coef_j = exp( sum_i(a_ij w_i ln(N_i / N0_i)) / sum_i(a_ij w_i) )
//! ```
//!
//! where `N0 = R f` is the folded response of the current spectrum. All
//! coefficients are computed from the same snapshot of `f` before any bin is
//! updated.
//!
//! Some guards keep the update finite without changing it otherwise:
//!
//! - detectors with a zero folded response, or a zero weight, contribute
//!   nothing to the sums for that iteration
//! - zero variances make those detectors the only ones weighted
//! - bins with nothing in the denominator keep a coefficient of 1
//!
//! A zero bin therefore stays exactly zero forever.

// crate modules
use crate::options::GravelOptions;
use crate::problem::Problem;
use crate::solution::Solution;

// origami modules
use origami_utils::ValueExt;

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

/// Run Gravel iterations from the given starting spectrum
///
/// Takes ownership of `initial`, which is the only thing modified. This is
/// deterministic for identical inputs.
pub(crate) fn solve(problem: &Problem, initial: DVector<f64>, options: &GravelOptions) -> Solution {
    let matrix = problem.matrix();
    let measured = problem.measured();
    let weights = weights(&measured, &problem.variance_vector());

    let mut flux = initial;
    let mut folded = matrix * &flux;
    let mut residual = (&folded - &measured).norm();
    let initial_residual = residual;

    let mut evolution = options.evolution.then(|| vec![flux.as_slice().to_vec()]);
    let mut iteration = 0;
    let mut warned = false;

    while iteration < options.max_iter && residual > options.tol {
        let excluded = folded.iter().filter(|n0| **n0 <= 0.0).count();
        if excluded > 0 && !warned {
            warn!("{excluded} detector(s) with zero folded response left out of the update");
            warned = true;
        }

        // coefficients are built entirely from the previous iterate first
        let coef = coefficients(matrix, &flux, &folded, &measured, &weights);
        flux.component_mul_assign(&coef);

        folded = matrix * &flux;
        residual = (&folded - &measured).norm();
        iteration += 1;

        debug!("Gravel iteration {iteration}: residual {}", residual.sci(5, 2));

        if let Some(history) = evolution.as_mut() {
            history.push(flux.as_slice().to_vec());
        }
    }

    if residual > options.tol {
        warn!(
            "Gravel reached {} iterations before the tolerance (residual {}, tol {})",
            options.max_iter,
            residual.sci(3, 2),
            options.tol.sci(3, 2)
        );
    }

    info!(
        "Gravel finished after {iteration} iterations, residual {} -> {}",
        initial_residual.sci(3, 2),
        residual.sci(3, 2)
    );

    Solution {
        flux: flux.as_slice().to_vec(),
        evolution,
        iterations: iteration,
        residual,
    }
}

/// Per-detector weights `N^2 / sigma2`
///
/// A zero variance gives an infinite weight, and in the limit those detectors
/// outweigh every other one. Undefined weights from `0 / 0` are zero.
fn weights(measured: &DVector<f64>, variances: &DVector<f64>) -> DVector<f64> {
    let raw = measured.zip_map(variances, |n, s2| n * n / s2);

    if raw.iter().any(|w| w.is_infinite()) {
        raw.map(|w| if w.is_infinite() { 1.0 } else { 0.0 })
    } else {
        raw.map(|w| if w.is_nan() { 0.0 } else { w })
    }
}

/// Multiplicative correction for every bin from one snapshot of the spectrum
fn coefficients(
    matrix: &DMatrix<f64>,
    flux: &DVector<f64>,
    folded: &DVector<f64>,
    measured: &DVector<f64>,
    weights: &DVector<f64>,
) -> DVector<f64> {
    let n_bins = flux.len();
    let mut top = DVector::<f64>::zeros(n_bins);
    let mut bot = DVector::<f64>::zeros(n_bins);

    for (i, row) in matrix.row_iter().enumerate() {
        let (n, n0, w) = (measured[i], folded[i], weights[i]);
        if n0 <= 0.0 || w == 0.0 {
            continue;
        }

        let log_term = (n / n0).ln();
        for j in 0..n_bins {
            let a = row[j] * flux[j] / n0;
            top[j] += a * w * log_term;
            bot[j] += a * w;
        }
    }

    top.zip_map(&bot, |t, b| if b > 0.0 { (t / b).exp() } else { 1.0 })
}
