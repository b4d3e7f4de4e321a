//! Inputs shared by every unfolding method

// crate modules
use crate::error::{Error, Result};
use crate::options::Method;
use crate::solution::Solution;
use crate::{gravel, maxed};

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

/// Validated set of inputs for an unfolding
///
/// Holds borrowed views of the caller's data. Nothing here is ever modified,
/// and every solver works on its own copy of the default spectrum.
///
/// - `responses` - measured response per detector, `N`
/// - `variances` - variance (not standard deviation) per detector, `sigma2`
/// - `matrix` - response matrix `R`, one row per detector and one column per bin
/// - `default` - prior spectrum `f_def`, one value per bin
///
/// Construction checks that the shapes agree and that values are sensible,
/// before any numerical work is done.
///
/// ```rust
/// # use origami_unfold::{Error, Problem};
/// # use nalgebra::DMatrix;
/// let matrix = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 3.0, 2.0, 1.0]);
///
/// // Consistent shapes
/// let problem = Problem::new(&[6.0, 6.0], &[0.1, 0.1], &matrix, &[1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(problem.n_detectors(), 2);
/// assert_eq!(problem.n_bins(), 3);
///
/// // Default spectrum with the wrong number of bins
/// assert_eq!(
///     Problem::new(&[6.0, 6.0], &[0.1, 0.1], &matrix, &[1.0, 1.0]).unwrap_err(),
///     Error::MatrixShapeMismatch { rows: 2, cols: 3, detectors: 2, bins: 2 }
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    responses: &'a [f64],
    variances: &'a [f64],
    matrix: &'a DMatrix<f64>,
    default: &'a [f64],
}

impl<'a> Problem<'a> {
    /// Check the inputs are consistent and wrap them up
    pub fn new(
        responses: &'a [f64],
        variances: &'a [f64],
        matrix: &'a DMatrix<f64>,
        default: &'a [f64],
    ) -> Result<Self> {
        let n_detectors = responses.len();
        let n_bins = default.len();

        if n_detectors == 0 || n_bins == 0 {
            return Err(Error::EmptyProblem);
        }

        if variances.len() != n_detectors {
            return Err(Error::ShapeMismatch {
                name: "variances",
                expected: n_detectors,
                found: variances.len(),
            });
        }

        if matrix.shape() != (n_detectors, n_bins) {
            return Err(Error::MatrixShapeMismatch {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
                detectors: n_detectors,
                bins: n_bins,
            });
        }

        check_non_negative("responses", responses)?;
        check_non_negative("variances", variances)?;
        check_non_negative("response matrix", matrix.as_slice())?;
        check_non_negative("default spectrum", default)?;

        Ok(Self {
            responses,
            variances,
            matrix,
            default,
        })
    }

    /// Number of detectors, i.e. rows of the response matrix
    pub fn n_detectors(&self) -> usize {
        self.responses.len()
    }

    /// Number of spectrum bins, i.e. columns of the response matrix
    pub fn n_bins(&self) -> usize {
        self.default.len()
    }

    /// Measured detector responses
    pub fn responses(&self) -> &[f64] {
        self.responses
    }

    /// Measured response variances
    pub fn variances(&self) -> &[f64] {
        self.variances
    }

    /// Response matrix
    pub fn matrix(&self) -> &DMatrix<f64> {
        self.matrix
    }

    /// Default spectrum
    pub fn default_spectrum(&self) -> &[f64] {
        self.default
    }

    /// Euclidean distance between the folded spectrum and the measurements
    ///
    /// ```rust
    /// # use origami_unfold::Problem;
    /// # use nalgebra::DMatrix;
    /// let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
    /// let problem = Problem::new(&[3.0, 4.0], &[1.0, 1.0], &matrix, &[1.0, 1.0]).unwrap();
    ///
    /// assert_eq!(problem.residual(&[3.0, 4.0]), 0.0);
    /// assert_eq!(problem.residual(&[0.0, 0.0]), 5.0);
    /// ```
    pub fn residual(&self, flux: &[f64]) -> f64 {
        self.residual_of(&DVector::from_column_slice(flux))
    }

    /// Unfold the spectrum with the chosen method
    ///
    /// Options are validated before anything is computed. If the options ask
    /// for it, the default spectrum is scaled to match the magnitude of the
    /// measurements before the selected solver starts. The solver result is
    /// returned as-is.
    pub fn unfold(&self, method: &Method) -> Result<Solution> {
        method.validate()?;

        // independent copy, the caller's default is never touched
        let mut initial = DVector::from_column_slice(self.default);
        if method.scale() {
            self.scale_default(&mut initial);
        }

        info!(
            "Unfolding {} bins from {} detectors with {}",
            self.n_bins(),
            self.n_detectors(),
            method.name()
        );

        match method {
            Method::Maxed(options) => Ok(maxed::solve(self, initial, options)),
            Method::Gravel(options) => Ok(gravel::solve(self, initial, options)),
            Method::StaySl => Err(Error::NotImplemented(method.name())),
        }
    }

    /// Rescale the initial spectrum by the average of `N / (R f)`
    ///
    /// Detectors with a zero folded response carry no information about the
    /// magnitude and are left out of the average.
    pub(crate) fn scale_default(&self, initial: &mut DVector<f64>) {
        let folded = self.matrix * &*initial;

        let ratios: Vec<f64> = self
            .responses
            .iter()
            .zip(folded.iter())
            .filter(|(_, n0)| **n0 > 0.0)
            .map(|(n, n0)| n / n0)
            .collect();

        if ratios.is_empty() {
            warn!("Default spectrum folds to zero for every detector, scaling skipped");
            return;
        }

        let factor = ratios.iter().sum::<f64>() / ratios.len() as f64;
        debug!("Scaling default spectrum by {factor}");
        *initial *= factor;
    }

    pub(crate) fn measured(&self) -> DVector<f64> {
        DVector::from_column_slice(self.responses)
    }

    pub(crate) fn variance_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(self.variances)
    }

    pub(crate) fn residual_of(&self, flux: &DVector<f64>) -> f64 {
        (self.matrix * flux - self.measured()).norm()
    }
}

fn check_non_negative(name: &'static str, values: &[f64]) -> Result<()> {
    match values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        Some((index, value)) => Err(Error::InvalidInput {
            name,
            index,
            value: *value,
        }),
        None => Ok(()),
    }
}
