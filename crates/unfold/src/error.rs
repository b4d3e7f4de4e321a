//! Result and Error types for origami-unfold

/// Type alias for Result<T, unfold::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `origami-unfold` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("inconsistent length of {name} (expected {expected:?}, found {found:?})")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "response matrix is {rows:?}x{cols:?}, expected {detectors:?} detectors by {bins:?} bins"
    )]
    MatrixShapeMismatch {
        rows: usize,
        cols: usize,
        detectors: usize,
        bins: usize,
    },

    #[error("unfolding needs at least one detector and one energy bin")]
    EmptyProblem,

    #[error("{name} must be finite and non-negative (found {value:?} at index {index:?})")]
    InvalidInput {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("invalid {name} option {value:?}, {reason}")]
    InvalidOption {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("{0} unfolding is not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Spectrum(#[from] origami_spectrum::Error),
}
