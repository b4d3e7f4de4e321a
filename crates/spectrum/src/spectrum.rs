//! Module for binned spectrum data and implementations

// crate modules
use crate::error::{Error, Result};
use crate::form::{Form, PlotData, PlotStyle};
use crate::rebin::{complete_edges, redistribute, DEFAULT_FLOOR};

// origami modules
use origami_utils::{f, SliceExt, ValueExt};

use itertools::Itertools;
use serde::Serialize;

/// Energy or angle binned quantity in integral and differential form
///
/// A [BinnedSpectrum] is built once and then only read. Both forms are
/// computed eagerly at construction from whichever is given, so the integral
/// value of every bin is always the differential value multiplied by the bin
/// width.
///
/// ## Bin edges
///
/// Edges must be unique and strictly increasing or decreasing. For `N` values
/// they may be either:
///
/// - `N+1` complete bin boundaries
/// - `N` upper edges, with the floor (default `0.0`) as the lowest boundary
///
/// Widths are absolute, so decreasing edges such as cosine bins running from
/// `1` to `-1` still give positive densities.
///
/// ```rust
/// # use origami_spectrum::{BinnedSpectrum, Form};
/// // Complete boundaries
/// let a = BinnedSpectrum::new(&[0.0, 1.0, 3.0], &[2.0, 4.0], &[0.2, 0.4], Form::Integral).unwrap();
///
/// // Same structure from the upper edges
/// let b = BinnedSpectrum::new(&[1.0, 3.0], &[2.0, 4.0], &[0.2, 0.4], Form::Integral).unwrap();
///
/// assert_eq!(a.edges(), b.edges());
/// assert_eq!(a.integral(), b.integral());
/// assert_eq!(a.widths(), &[1.0, 2.0]);
/// assert_eq!(a.midpoints(), &[0.5, 2.0]);
/// assert_eq!(a.differential(), &[2.0, 2.0]);
/// assert_eq!(a.differential_error(), &[0.2, 0.2]);
/// ```
///
/// ## Arithmetic
///
/// Spectra on different bin structures can not be meaningfully combined
/// without a rebin, so no arithmetic operators are implemented.
///
/// ```rust, compile_fail
/// # use origami_spectrum::{BinnedSpectrum, Form};
/// let a = BinnedSpectrum::without_error(&[1.0, 2.0], &[1.0, 1.0], Form::Integral).unwrap();
/// let b = BinnedSpectrum::without_error(&[1.0, 3.0], &[1.0, 1.0], Form::Integral).unwrap();
/// let c = a + b;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedSpectrum {
    edges: Vec<f64>,
    widths: Vec<f64>,
    midpoints: Vec<f64>,
    integral: Vec<f64>,
    integral_error: Vec<f64>,
    differential: Vec<f64>,
    differential_error: Vec<f64>,
    /// Lower bound implied when built from upper edges only
    #[serde(skip)]
    floor: Option<f64>,
}

impl BinnedSpectrum {
    /// Create a spectrum from values in the given form
    ///
    /// Edges given as upper edges only use a floor of `0.0`. See
    /// [with_floor()](BinnedSpectrum::with_floor) for anything else.
    pub fn new(edges: &[f64], values: &[f64], errors: &[f64], form: Form) -> Result<Self> {
        Self::with_floor(edges, values, errors, form, DEFAULT_FLOOR)
    }

    /// Create a spectrum with a custom lower bound for the first bin
    ///
    /// The floor is only used when `edges` has the same length as `values`.
    ///
    /// ```rust
    /// # use origami_spectrum::{BinnedSpectrum, Form};
    /// let s = BinnedSpectrum::with_floor(
    ///     &[1e-6, 1.0, 20.0],
    ///     &[1.0, 1.0, 1.0],
    ///     &[0.0, 0.0, 0.0],
    ///     Form::Differential,
    ///     1e-11,
    /// ).unwrap();
    ///
    /// assert_eq!(s.edges()[0], 1e-11);
    /// assert_eq!(s.len(), 3);
    /// ```
    pub fn with_floor(
        edges: &[f64],
        values: &[f64],
        errors: &[f64],
        form: Form,
        floor: f64,
    ) -> Result<Self> {
        if values.len() != errors.len() {
            return Err(Error::LengthMismatch {
                values: values.len(),
                errors: errors.len(),
            });
        }

        if !values.all_finite() || !errors.all_finite() {
            return Err(Error::UndefinedValues);
        }

        let upper_only = edges.len() == values.len();
        let edges = complete_edges(edges, values.len(), floor)?;
        let (widths, midpoints): (Vec<f64>, Vec<f64>) = edges
            .iter()
            .tuple_windows()
            .map(|(lo, hi)| ((hi - lo).abs(), 0.5 * (lo + hi)))
            .unzip();

        // the given form is authoritative and the other derived from it
        let (integral, integral_error, differential, differential_error) = match form {
            Form::Integral => (
                values.to_vec(),
                errors.to_vec(),
                per_width(values, &widths),
                per_width(errors, &widths),
            ),
            Form::Differential => (
                times_width(values, &widths),
                times_width(errors, &widths),
                values.to_vec(),
                errors.to_vec(),
            ),
        };

        Ok(Self {
            edges,
            widths,
            midpoints,
            integral,
            integral_error,
            differential,
            differential_error,
            floor: upper_only.then_some(floor),
        })
    }

    /// Create a spectrum where every bin has zero error
    ///
    /// Useful for true or default spectra in synthetic problems.
    pub fn without_error(edges: &[f64], values: &[f64], form: Form) -> Result<Self> {
        Self::new(edges, values, &vec![0.0; values.len()], form)
    }

    /// Complete set of `N+1` bin boundaries
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Absolute width of every bin
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Arithmetic centre of every bin
    pub fn midpoints(&self) -> &[f64] {
        &self.midpoints
    }

    /// Total per bin
    pub fn integral(&self) -> &[f64] {
        &self.integral
    }

    /// Absolute error on the total per bin
    pub fn integral_error(&self) -> &[f64] {
        &self.integral_error
    }

    /// Density per unit width
    pub fn differential(&self) -> &[f64] {
        &self.differential
    }

    /// Absolute error on the density per unit width
    pub fn differential_error(&self) -> &[f64] {
        &self.differential_error
    }

    /// Values in the requested form
    pub fn values(&self, form: Form) -> &[f64] {
        match form {
            Form::Integral => &self.integral,
            Form::Differential => &self.differential,
        }
    }

    /// Errors in the requested form
    pub fn errors(&self, form: Form) -> &[f64] {
        match form {
            Form::Integral => &self.integral_error,
            Form::Differential => &self.differential_error,
        }
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.integral.len()
    }

    /// True if there are no bins
    ///
    /// Construction needs at least one bin, so this is only here for
    /// completeness alongside [len()](BinnedSpectrum::len).
    pub fn is_empty(&self) -> bool {
        self.integral.is_empty()
    }

    /// Sum of the integral values over every bin
    pub fn total(&self) -> f64 {
        self.integral.iter().sum()
    }

    /// Coordinates for plotting in the given style and form
    ///
    /// No rendering happens here. The step style gives two points per bin so
    /// that a simple line plot draws the histogram outline. The error bar
    /// style gives one point per bin at the midpoint along with the errors.
    ///
    /// ```rust
    /// # use origami_spectrum::{BinnedSpectrum, Form, PlotStyle};
    /// let s = BinnedSpectrum::new(&[0.0, 1.0, 3.0], &[2.0, 4.0], &[0.2, 0.4], Form::Integral).unwrap();
    ///
    /// let step = s.plot(PlotStyle::Step, Form::Integral);
    /// assert_eq!(step.x, vec![0.0, 1.0, 1.0, 3.0]);
    /// assert_eq!(step.y, vec![2.0, 2.0, 4.0, 4.0]);
    /// assert_eq!(step.yerr, None);
    ///
    /// let bars = s.plot(PlotStyle::ErrorBar, Form::Differential);
    /// assert_eq!(bars.x, vec![0.5, 2.0]);
    /// assert_eq!(bars.y, vec![2.0, 2.0]);
    /// assert_eq!(bars.yerr, Some(vec![0.2, 0.2]));
    /// ```
    pub fn plot(&self, style: PlotStyle, form: Form) -> PlotData {
        let values = self.values(form);
        match style {
            PlotStyle::Step => {
                let x = self
                    .edges
                    .iter()
                    .tuple_windows()
                    .flat_map(|(lo, hi)| [*lo, *hi])
                    .collect();
                let y = values.iter().flat_map(|v| [*v, *v]).collect();
                PlotData { x, y, yerr: None }
            }
            PlotStyle::ErrorBar => PlotData {
                x: self.midpoints.clone(),
                y: values.to_vec(),
                yerr: Some(self.errors(form).to_vec()),
            },
        }
    }

    /// Move the spectrum onto a new bin structure
    ///
    /// New edges follow the same convention the spectrum was built with. A
    /// spectrum built from `N+1` boundaries takes complete boundaries, and one
    /// built from `N` upper edges takes upper edges with the same floor.
    ///
    /// Integral values are redistributed by fractional overlap, see
    /// [rebin()](crate::rebin) for the details and the treatment of errors.
    ///
    /// ```rust
    /// # use origami_spectrum::{BinnedSpectrum, Form};
    /// let s = BinnedSpectrum::without_error(&[0.0, 1.0, 2.0, 4.0], &[1.0, 1.0, 2.0], Form::Integral).unwrap();
    /// let r = s.rebin(&[0.0, 2.0, 4.0]).unwrap();
    ///
    /// assert_eq!(r.integral(), &[2.0, 2.0]);
    /// assert_eq!(r.total(), s.total());
    ///
    /// // Upper edges only, extending down to the floor of 0.0
    /// let s = BinnedSpectrum::without_error(&[1.0, 2.0, 4.0], &[1.0, 1.0, 2.0], Form::Integral).unwrap();
    /// let r = s.rebin(&[2.0, 4.0]).unwrap();
    ///
    /// assert_eq!(r.edges(), &[0.0, 2.0, 4.0]);
    /// assert_eq!(r.integral(), &[2.0, 2.0]);
    /// ```
    pub fn rebin(&self, new_edges: &[f64]) -> Result<Self> {
        let (n_new, floor) = match self.floor {
            Some(floor) => (new_edges.len(), floor),
            None => (new_edges.len().saturating_sub(1), DEFAULT_FLOOR),
        };
        let new_edges = complete_edges(new_edges, n_new, floor)?;

        let (values, errors) = redistribute(
            &self.edges,
            &self.integral,
            &self.integral_error,
            &new_edges,
        )?;

        let mut rebinned = Self::new(&new_edges, &values, &errors, Form::Integral)?;
        rebinned.floor = self.floor;
        Ok(rebinned)
    }

    /// Merge adjacent bins between the given edge indices
    ///
    /// Every consecutive pair of indices into [edges()](BinnedSpectrum::edges)
    /// becomes one new bin. This is intended for response functions and other
    /// per-bin quantities that should be averaged rather than summed, so each
    /// new integral value is the width weighted average of the merged bins.
    /// Errors are combined as the root sum square of the width weighted errors
    /// over the same total width.
    ///
    /// Indices must be strictly increasing and within the edge array.
    ///
    /// ```rust
    /// # use origami_spectrum::{BinnedSpectrum, Form};
    /// let s = BinnedSpectrum::without_error(
    ///     &[0.0, 1.0, 2.0, 4.0, 5.0],
    ///     &[3.0, 3.0, 6.0, 1.0],
    ///     Form::Integral,
    /// ).unwrap();
    ///
    /// let c = s.collapse(&[0, 3, 4]).unwrap();
    /// assert_eq!(c.edges(), &[0.0, 4.0, 5.0]);
    /// assert_eq!(c.integral(), &[4.5, 1.0]);
    /// ```
    pub fn collapse(&self, edge_indices: &[usize]) -> Result<Self> {
        let valid = edge_indices.len() >= 2
            && edge_indices.windows(2).all(|w| w[0] < w[1])
            && edge_indices.iter().all(|i| *i < self.edges.len());

        if !valid {
            return Err(Error::InvalidCollapseIndices {
                indices: edge_indices.to_vec(),
                n_edges: self.edges.len(),
            });
        }

        let mut values = Vec::with_capacity(edge_indices.len() - 1);
        let mut errors = Vec::with_capacity(edge_indices.len() - 1);

        for (start, end) in edge_indices.iter().tuple_windows() {
            let widths = &self.widths[*start..*end];
            let total_width: f64 = widths.iter().sum();

            let value: f64 = self.integral[*start..*end]
                .iter()
                .zip(widths)
                .map(|(v, w)| v * w)
                .sum();

            let variance: f64 = self.integral_error[*start..*end]
                .iter()
                .zip(widths)
                .map(|(e, w)| (e * w).powi(2))
                .sum();

            values.push(value / total_width);
            errors.push(variance.sqrt() / total_width);
        }

        let edges: Vec<f64> = edge_indices.iter().map(|i| self.edges[*i]).collect();
        Self::new(&edges, &values, &errors, Form::Integral)
    }
}

impl std::fmt::Display for BinnedSpectrum {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "{:>12} {:>12} {:>12} {:>12} {:>12}",
            "lower", "upper", "integral", "error", "differential"
        )?;

        for (i, (lo, hi)) in self.edges.iter().tuple_windows().enumerate() {
            let line = f!(
                "{:>12} {:>12} {:>12} {:>12} {:>12}",
                lo.sci(5, 2),
                hi.sci(5, 2),
                self.integral[i].sci(5, 2),
                self.integral_error[i].sci(5, 2),
                self.differential[i].sci(5, 2),
            );
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}

fn per_width(values: &[f64], widths: &[f64]) -> Vec<f64> {
    values.iter().zip(widths).map(|(v, w)| v / w).collect()
}

fn times_width(values: &[f64], widths: &[f64]) -> Vec<f64> {
    values.iter().zip(widths).map(|(v, w)| v * w).collect()
}
