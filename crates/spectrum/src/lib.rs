//! Binned spectrum container and rebinning
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod form;
mod rebin;
mod spectrum;

#[doc(inline)]
pub use spectrum::BinnedSpectrum;

#[doc(inline)]
pub use form::{Form, PlotData, PlotStyle};

#[doc(inline)]
pub use rebin::{rebin, rebin_with_floor, DEFAULT_FLOOR};

#[doc(inline)]
pub use error::{Error, Result};
