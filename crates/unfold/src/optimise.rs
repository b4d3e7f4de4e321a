//! Local and global minimisation of smooth-ish objective functions
//!
//! The local search is a quasi-Newton BFGS method with a backtracking line
//! search. The global search is basin hopping, repeated local searches from
//! randomly displaced starting points with Metropolis acceptance.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use rand::Rng;

/// Stop once every gradient component is below this
const GRADIENT_TOL: f64 = 1e-5;

/// Sufficient decrease parameter for the Armijo condition
const ARMIJO: f64 = 1e-4;

/// Maximum number of step halvings in a line search
const MAX_BACKTRACK: usize = 60;

/// Minimum curvature `s.y` for a BFGS update to be applied
const MIN_CURVATURE: f64 = 1e-10;

/// A function to minimise along with its gradient
pub(crate) trait Objective {
    /// Function value at `x`, may be infinite where undefined
    fn value(&self, x: &DVector<f64>) -> f64;

    /// Gradient at `x`
    fn gradient(&self, x: &DVector<f64>) -> DVector<f64>;
}

/// Location and value of a minimum
#[derive(Debug, Clone)]
pub(crate) struct Minimum {
    pub x: DVector<f64>,
    pub value: f64,
    pub converged: bool,
}

/// Local minimisation with BFGS
///
/// Returns the best point reached, flagged as converged only if the gradient
/// criterion was met. Stalled line searches end the search early.
pub(crate) fn bfgs<O: Objective>(objective: &O, start: DVector<f64>) -> Minimum {
    let n = start.len();
    let max_iter = 200 * n.max(1);

    let mut x = start;
    let mut fx = objective.value(&x);
    if !fx.is_finite() {
        return Minimum {
            x,
            value: fx,
            converged: false,
        };
    }

    let mut g = objective.gradient(&x);
    let mut h = DMatrix::<f64>::identity(n, n);
    let mut converged = false;

    for _ in 0..max_iter {
        if g.amax() < GRADIENT_TOL {
            converged = true;
            break;
        }

        let mut p = -(&h * &g);
        let mut slope = g.dot(&p);

        // not a descent direction, fall back to steepest descent
        if slope >= 0.0 {
            h = DMatrix::identity(n, n);
            p = -g.clone();
            slope = g.dot(&p);
        }

        let Some((x_new, f_new)) = line_search(objective, &x, fx, &p, slope) else {
            trace!("Line search stalled at {fx}");
            break;
        };

        let g_new = objective.gradient(&x_new);
        let s = &x_new - &x;
        let y = &g_new - &g;

        let sy = s.dot(&y);
        if sy > MIN_CURVATURE {
            let rho = 1.0 / sy;
            let identity = DMatrix::<f64>::identity(n, n);
            let left = &identity - &s * y.transpose() * rho;
            let right = &identity - &y * s.transpose() * rho;
            h = &left * &h * &right + &s * s.transpose() * rho;
        }

        let step = s.norm();
        x = x_new;
        fx = f_new;
        g = g_new;

        if step < f64::EPSILON {
            break;
        }
    }

    Minimum {
        x,
        value: fx,
        converged,
    }
}

/// Backtracking search along `p` for a sufficient decrease
fn line_search<O: Objective>(
    objective: &O,
    x: &DVector<f64>,
    fx: f64,
    p: &DVector<f64>,
    slope: f64,
) -> Option<(DVector<f64>, f64)> {
    let mut alpha = 1.0;
    for _ in 0..MAX_BACKTRACK {
        let trial = x + p * alpha;
        let value = objective.value(&trial);
        if value.is_finite() && value <= fx + ARMIJO * alpha * slope {
            return Some((trial, value));
        }
        alpha *= 0.5;
    }
    None
}

/// Global search by basin hopping
#[derive(Debug, Clone, Copy)]
pub(crate) struct BasinHopping {
    /// Number of perturb-and-minimise iterations
    pub hops: usize,
    /// Largest displacement per coordinate
    pub step_size: f64,
    /// Metropolis temperature
    pub temperature: f64,
}

impl BasinHopping {
    /// Run from `start`, returning the lowest minimum found
    pub fn run<O: Objective, R: Rng>(&self, objective: &O, start: DVector<f64>, rng: &mut R) -> Minimum {
        let mut current = bfgs(objective, start);
        let mut best = current.clone();

        for hop in 0..self.hops {
            let displaced = current
                .x
                .map(|v| v + rng.gen_range(-self.step_size..=self.step_size));
            let trial = bfgs(objective, displaced);

            if !trial.value.is_finite() {
                continue;
            }

            if trial.value < best.value {
                best = trial.clone();
            }

            if self.accept(trial.value, current.value, rng) {
                current = trial;
            }

            debug!("Hop {hop}: current {}, best {}", current.value, best.value);
        }

        best
    }

    /// Metropolis criterion for moving to a new minimum
    fn accept<R: Rng>(&self, new: f64, old: f64, rng: &mut R) -> bool {
        if new < old {
            return true;
        }
        if self.temperature == 0.0 {
            return false;
        }
        rng.gen::<f64>() < (-(new - old) / self.temperature).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Shifted quadratic bowl with its minimum at (1, -2)
    struct Bowl;

    impl Objective for Bowl {
        fn value(&self, x: &DVector<f64>) -> f64 {
            (x[0] - 1.0).powi(2) + 3.0 * (x[1] + 2.0).powi(2)
        }

        fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
            DVector::from_column_slice(&[2.0 * (x[0] - 1.0), 6.0 * (x[1] + 2.0)])
        }
    }

    /// Two wells, the one at x = 2 deeper than the one at x = -1
    struct DoubleWell;

    impl Objective for DoubleWell {
        fn value(&self, x: &DVector<f64>) -> f64 {
            let a = (x[0] + 1.0).powi(2);
            let b = (x[0] - 2.0).powi(2);
            a * b - 0.5 * x[0]
        }

        fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
            let a = x[0] + 1.0;
            let b = x[0] - 2.0;
            DVector::from_element(1, 2.0 * a * b * b + 2.0 * a * a * b - 0.5)
        }
    }

    #[test]
    fn bfgs_finds_quadratic_minimum() {
        let min = bfgs(&Bowl, DVector::from_column_slice(&[10.0, 10.0]));
        assert!(min.converged);
        assert!((min.x[0] - 1.0).abs() < 1e-5);
        assert!((min.x[1] + 2.0).abs() < 1e-5);
        assert!(min.value < 1e-9);
    }

    #[test]
    fn bfgs_stays_in_the_nearest_well() {
        let min = bfgs(&DoubleWell, DVector::from_element(1, -0.95));
        assert!(min.x[0] < 0.0);
    }

    #[test]
    fn basin_hopping_escapes_the_shallow_well() {
        let hopper = BasinHopping {
            hops: 100,
            step_size: 2.0,
            temperature: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let min = hopper.run(&DoubleWell, DVector::from_element(1, -0.95), &mut rng);
        assert!(min.x[0] > 1.0, "stuck at {}", min.x[0]);
    }

    #[test]
    fn basin_hopping_is_reproducible() {
        let hopper = BasinHopping {
            hops: 20,
            step_size: 0.5,
            temperature: 1.0,
        };

        let a = hopper.run(&Bowl, DVector::from_column_slice(&[3.0, 3.0]), &mut StdRng::seed_from_u64(1));
        let b = hopper.run(&Bowl, DVector::from_column_slice(&[3.0, 3.0]), &mut StdRng::seed_from_u64(1));
        assert_eq!(a.x, b.x);
        assert_eq!(a.value, b.value);
    }
}
