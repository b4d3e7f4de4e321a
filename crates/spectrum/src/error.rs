//! Result and Error types for origami-spectrum

/// Type alias for Result<T, spectrum::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `origami-spectrum` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Edges repeat, change direction, or contain undefined values
    #[error("bin edges must be unique and strictly increasing or decreasing")]
    InvalidEdges(#[from] origami_utils::Error),

    #[error("inconsistent number of errors (expected {values:?}, found {errors:?})")]
    LengthMismatch { values: usize, errors: usize },

    #[error("expected {values:?} or {} bin edges for {values:?} values, found {found:?}", .values + 1)]
    EdgeCountMismatch { values: usize, found: usize },

    #[error("spectrum values or errors contain NAN or INFINITY")]
    UndefinedValues,

    #[error("collapse indices {indices:?} are not strictly increasing within {n_edges:?} edges")]
    InvalidCollapseIndices { indices: Vec<usize>, n_edges: usize },

    #[error("failed to infer spectrum form from \"{0}\"")]
    FailedToInferForm(String),

    #[error("failed to infer plot style from \"{0}\"")]
    FailedToInferPlotStyle(String),
}
