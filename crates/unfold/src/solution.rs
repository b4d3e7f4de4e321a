//! Unfolded spectrum and run diagnostics

// crate modules
use crate::error::Result;

// origami modules
use origami_spectrum::{BinnedSpectrum, Form};
use origami_utils::ValueExt;

use serde::Serialize;

/// Result of an unfolding
///
/// `flux` is the final answer, one value per bin in the same form as the
/// default spectrum that was folded through the response matrix.
///
/// The rest is diagnostic and never affects `flux`:
///
/// - `evolution` - every intermediate spectrum oldest first, including the
///   initial and final ones, when requested from Gravel
/// - `iterations` - Gravel iterations or MAXED basin hops performed
/// - `residual` - Euclidean norm of `R f - N` for the final `flux`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Unfolded spectrum
    pub flux: Vec<f64>,
    /// Spectrum at every iteration, if recorded
    pub evolution: Option<Vec<Vec<f64>>>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Distance of the folded solution from the measurements
    pub residual: f64,
}

impl Solution {
    /// Wrap the unfolded flux as a spectrum on the given bin edges
    ///
    /// Edges follow the usual [BinnedSpectrum] rules of either `N+1` complete
    /// boundaries or `N` upper edges. The flux has no uncertainty attached.
    ///
    /// ```rust
    /// # use origami_unfold::Solution;
    /// # use origami_spectrum::Form;
    /// let solution = Solution {
    ///     flux: vec![2.0, 4.0],
    ///     evolution: None,
    ///     iterations: 10,
    ///     residual: 0.0,
    /// };
    ///
    /// let spectrum = solution.to_spectrum(&[1.0, 3.0], Form::Integral).unwrap();
    /// assert_eq!(spectrum.differential(), &[2.0, 2.0]);
    /// ```
    pub fn to_spectrum(&self, edges: &[f64], form: Form) -> Result<BinnedSpectrum> {
        Ok(BinnedSpectrum::without_error(edges, &self.flux, form)?)
    }

    /// Split into the final flux and the recorded evolution
    pub fn into_parts(self) -> (Vec<f64>, Option<Vec<Vec<f64>>>) {
        (self.flux, self.evolution)
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "iterations: {}", self.iterations)?;
        writeln!(f, "residual  : {}", self.residual.sci(5, 2))?;
        for (i, v) in self.flux.iter().enumerate() {
            writeln!(f, "{i:>5} {}", v.sci(5, 2))?;
        }
        Ok(())
    }
}
