//! MAXED maximum entropy unfolding
//!
//! The spectrum is parametrised by one Lagrange multiplier per detector
//!
//! ```text
//! f(lambda) = f_def * exp(-R^T lambda)
//! ```
//!
//! which keeps every bin non-negative wherever the default is. The dual
//! potential
//!
//! ```text
//! Z(lambda) = -sum(f(lambda)) - sqrt(omega * sum(lambda^2 sigma2)) - sum(N lambda)
//! ```
//!
//! is maximised by minimising `-Z` with a basin hopping global search, since
//! the square root term is not smooth at the origin and local searches alone
//! can settle in the wrong place.
//!
//! There is no guarantee the global maximum is found. The best point from the
//! search is returned regardless.

// crate modules
use crate::optimise::{BasinHopping, Minimum, Objective};
use crate::options::MaxedOptions;
use crate::problem::Problem;
use crate::solution::Solution;

// origami modules
use origami_utils::ValueExt;

use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Negated MAXED dual potential
struct Dual<'a> {
    matrix: &'a DMatrix<f64>,
    measured: DVector<f64>,
    variances: DVector<f64>,
    default: DVector<f64>,
    omega: f64,
}

impl Dual<'_> {
    /// Spectrum for a set of multipliers, exactly zero where the default is
    fn spectrum(&self, lambda: &DVector<f64>) -> DVector<f64> {
        let exponent = self.matrix.tr_mul(lambda);
        self.default.zip_map(&exponent, |d, e| {
            if d == 0.0 {
                0.0
            } else {
                d * (-e).exp()
            }
        })
    }

    /// `sqrt(omega * sum(lambda^2 sigma2))`
    fn deviation(&self, lambda: &DVector<f64>) -> f64 {
        let weighted: f64 = lambda
            .iter()
            .zip(self.variances.iter())
            .map(|(l, s2)| l * l * s2)
            .sum();
        (self.omega * weighted).sqrt()
    }
}

impl Objective for Dual<'_> {
    fn value(&self, lambda: &DVector<f64>) -> f64 {
        self.spectrum(lambda).sum() + self.deviation(lambda) + self.measured.dot(lambda)
    }

    fn gradient(&self, lambda: &DVector<f64>) -> DVector<f64> {
        let folded = self.matrix * self.spectrum(lambda);
        let deviation = self.deviation(lambda);

        let mut gradient = &self.measured - folded;
        // the square root term has no gradient at the origin, take zero there
        if deviation > 0.0 {
            gradient += lambda.component_mul(&self.variances) * (self.omega / deviation);
        }
        gradient
    }
}

/// Run the MAXED search from the given default spectrum
///
/// Multipliers start from a vector of ones. Each chain is an independent basin
/// hopping search with its own seed, run in parallel, and the lowest minimum of
/// all chains decides the spectrum.
pub(crate) fn solve(problem: &Problem, initial: DVector<f64>, options: &MaxedOptions) -> Solution {
    let dual = Dual {
        matrix: problem.matrix(),
        measured: problem.measured(),
        variances: problem.variance_vector(),
        default: initial,
        omega: options.omega,
    };

    let hopper = BasinHopping {
        hops: options.hops,
        step_size: options.step_size,
        temperature: options.temperature,
    };

    let start = DVector::from_element(problem.n_detectors(), 1.0);

    let best = (0..options.chains)
        .into_par_iter()
        .map(|chain| {
            let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(chain as u64));
            hopper.run(&dual, start.clone(), &mut rng)
        })
        .reduce_with(|a, b| if b.value < a.value { b } else { a })
        .unwrap_or_else(|| Minimum {
            value: dual.value(&start),
            x: start.clone(),
            converged: false,
        });

    if !best.converged {
        warn!(
            "MAXED search ended away from a stationary point (objective {})",
            best.value.sci(5, 2)
        );
    }

    let flux = dual.spectrum(&best.x);
    let residual = problem.residual_of(&flux);

    info!(
        "MAXED finished after {} hops over {} chain(s), residual {}",
        options.hops,
        options.chains,
        residual.sci(3, 2)
    );

    Solution {
        flux: flux.as_slice().to_vec(),
        evolution: None,
        iterations: options.hops,
        residual,
    }
}
