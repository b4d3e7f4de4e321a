//! `origami` is a small toolkit for unfolding neutron flux spectra from
//! detector measurements
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use origami_spectrum as spectrum;

#[doc(inline)]
pub use origami_unfold as unfold;

#[doc(inline)]
pub use origami_utils as utils;
