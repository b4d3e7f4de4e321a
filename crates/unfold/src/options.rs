//! Unfolding methods and their typed options

// crate modules
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// Unfolding method, carrying the options for that method
///
/// Options are plain data with sensible defaults, so a method can be built in
/// code or deserialised from configuration with only the interesting fields.
///
/// ```rust
/// # use origami_unfold::{GravelOptions, MaxedOptions, Method};
/// // Build directly
/// let gravel = Method::Gravel(GravelOptions {
///     max_iter: 50,
///     tol: 0.0,
///     ..Default::default()
/// });
///
/// let maxed = Method::Maxed(MaxedOptions {
///     omega: 9.0,
///     scale: true,
///     ..Default::default()
/// });
///
/// assert_eq!(gravel.name(), "Gravel");
/// assert!(maxed.scale());
/// ```
///
/// The least squares method of the STAY'SL code is reserved but not yet
/// available. Selecting it always fails with
/// [Error::NotImplemented](crate::Error::NotImplemented).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Method {
    /// Maximum entropy unfolding
    Maxed(MaxedOptions),
    /// Generalised SAND-II iterative unfolding
    Gravel(GravelOptions),
    /// Least squares unfolding (not implemented)
    #[serde(rename = "staysl")]
    StaySl,
}

impl Method {
    /// Display name of the method i.e. 'MAXED', 'Gravel'
    pub fn name(&self) -> &'static str {
        match self {
            Method::Maxed(_) => "MAXED",
            Method::Gravel(_) => "Gravel",
            Method::StaySl => "STAY'SL",
        }
    }

    /// Whether the default spectrum is scaled to the measurements first
    pub fn scale(&self) -> bool {
        match self {
            Method::Maxed(options) => options.scale,
            Method::Gravel(options) => options.scale,
            Method::StaySl => false,
        }
    }

    /// Check every option is within its allowed range
    ///
    /// ```rust
    /// # use origami_unfold::{Error, GravelOptions, MaxedOptions, Method};
    /// assert!(Method::Gravel(GravelOptions::default()).validate().is_ok());
    ///
    /// let bad = Method::Maxed(MaxedOptions { omega: 0.0, ..Default::default() });
    /// assert!(bad.validate().is_err());
    ///
    /// assert_eq!(
    ///     Method::StaySl.validate(),
    ///     Err(Error::NotImplemented("STAY'SL"))
    /// );
    /// ```
    pub fn validate(&self) -> Result<()> {
        match self {
            Method::Maxed(options) => options.validate(),
            Method::Gravel(options) => options.validate(),
            Method::StaySl => Err(Error::NotImplemented(self.name())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Options for MAXED unfolding
///
/// - `omega` - target value of the chi-squared deviation from the measurements
/// - `scale` - scale the default spectrum to the measurements first
///
/// The remaining fields tune the global search over Lagrange multipliers. Each
/// hop perturbs every multiplier by a uniform random step of up to
/// `step_size`, runs a local minimisation, and keeps the new minimum by the
/// Metropolis criterion at `temperature`.
///
/// Independent searches are run for each of `chains`, in parallel, seeded from
/// `seed` onwards. The best minimum of all chains is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxedOptions {
    /// Target deviation, must be positive
    pub omega: f64,
    /// Scale the default spectrum before unfolding
    pub scale: bool,
    /// Number of basin hopping iterations per chain
    pub hops: usize,
    /// Largest random displacement per multiplier
    pub step_size: f64,
    /// Metropolis acceptance temperature
    pub temperature: f64,
    /// Number of independent chains
    pub chains: usize,
    /// Seed for the first chain
    pub seed: u64,
}

impl Default for MaxedOptions {
    fn default() -> Self {
        Self {
            omega: 1.0,
            scale: false,
            hops: 100,
            step_size: 0.5,
            temperature: 1.0,
            chains: 1,
            seed: 0,
        }
    }
}

impl MaxedOptions {
    fn validate(&self) -> Result<()> {
        if !(self.omega.is_finite() && self.omega > 0.0) {
            return Err(Error::InvalidOption {
                name: "omega",
                value: self.omega,
                reason: "must be a positive number",
            });
        }

        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(Error::InvalidOption {
                name: "step_size",
                value: self.step_size,
                reason: "must be a positive number",
            });
        }

        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(Error::InvalidOption {
                name: "temperature",
                value: self.temperature,
                reason: "must be zero or a positive number",
            });
        }

        if self.chains == 0 {
            return Err(Error::InvalidOption {
                name: "chains",
                value: 0.0,
                reason: "at least one chain is needed",
            });
        }

        Ok(())
    }
}

/// Options for Gravel unfolding
///
/// - `max_iter` - upper limit on the number of iterations
/// - `tol` - stop once the folded spectrum is this close to the measurements
/// - `evolution` - keep a copy of the spectrum at every iteration
/// - `scale` - scale the default spectrum to the measurements first
///
/// Iteration stops at whichever of `max_iter` or `tol` is reached first. The
/// distance used for `tol` is the Euclidean norm of `R f - N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravelOptions {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Tolerance on the residual norm, must not be negative
    pub tol: f64,
    /// Record every intermediate spectrum
    pub evolution: bool,
    /// Scale the default spectrum before unfolding
    pub scale: bool,
}

impl Default for GravelOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-4,
            evolution: false,
            scale: false,
        }
    }
}

impl GravelOptions {
    fn validate(&self) -> Result<()> {
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(Error::InvalidOption {
                name: "tol",
                value: self.tol,
                reason: "must be zero or a positive number",
            });
        }
        Ok(())
    }
}
