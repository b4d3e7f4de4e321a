//! Neutron spectrum unfolding
//!
#![doc = include_str!("../readme.md")]

mod error;
mod gravel;
mod maxed;
mod optimise;
mod options;
mod problem;
mod solution;

#[doc(inline)]
pub use options::{GravelOptions, MaxedOptions, Method};

#[doc(inline)]
pub use problem::Problem;

#[doc(inline)]
pub use solution::Solution;

#[doc(inline)]
pub use error::{Error, Result};

use nalgebra::{DMatrix, DVector};

/// Unfold a spectrum from measured detector responses
///
/// - `responses` - measured response per detector, `N`
/// - `variances` - variance per detector, `sigma2`
/// - `matrix` - response matrix `R` of shape (detectors, bins)
/// - `default` - default spectrum `f_def`
/// - `method` - unfolding method and its options
///
/// The options and the shapes of every input are checked before any numerical
/// work. None of the inputs are modified.
///
/// ```rust
/// # use origami_unfold::{unfold, Error, GravelOptions, Method};
/// # use nalgebra::DMatrix;
/// let matrix = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
/// let method = Method::Gravel(GravelOptions::default());
///
/// let solution = unfold(&[5.0, 10.0], &[0.1, 0.1], &matrix, &[1.0, 1.0], &method).unwrap();
/// assert!(solution.residual <= 1e-4);
///
/// // A response matrix that does not match the other inputs
/// let result = unfold(&[5.0, 10.0], &[0.1, 0.1], &matrix, &[1.0, 1.0, 1.0], &method);
/// assert!(matches!(result, Err(Error::MatrixShapeMismatch { .. })));
/// ```
pub fn unfold(
    responses: &[f64],
    variances: &[f64],
    matrix: &DMatrix<f64>,
    default: &[f64],
    method: &Method,
) -> Result<Solution> {
    method.validate()?;
    Problem::new(responses, variances, matrix, default)?.unfold(method)
}

/// Fold a spectrum through a response matrix
///
/// Gives the predicted response of every detector, `R f`.
///
/// ```rust
/// # use origami_unfold::fold;
/// # use nalgebra::DMatrix;
/// let matrix = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 0.0, 1.0, 0.0]);
/// assert_eq!(fold(&matrix, &[1.0, 1.0, 1.0]).unwrap(), vec![6.0, 1.0]);
/// assert!(fold(&matrix, &[1.0, 1.0]).is_err());
/// ```
pub fn fold(matrix: &DMatrix<f64>, spectrum: &[f64]) -> Result<Vec<f64>> {
    if matrix.ncols() != spectrum.len() {
        return Err(Error::ShapeMismatch {
            name: "spectrum",
            expected: matrix.ncols(),
            found: spectrum.len(),
        });
    }

    let folded = matrix * DVector::from_column_slice(spectrum);
    Ok(folded.as_slice().to_vec())
}
