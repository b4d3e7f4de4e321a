//! Spectrum forms and plot coordinate styles

// crate modules
use crate::error::Error;

use serde::{Deserialize, Serialize};

/// Representation of binned values
///
/// Integral values are the total in each bin, differential values are the
/// density per unit of the binned quantity (i.e. per MeV for energy bins).
/// The two are related by the bin width.
///
/// [Form] implements `TryFrom<&str>` for the common short names.
///
/// ```rust
/// # use origami_spectrum::Form;
/// assert_eq!(Form::Integral, Form::try_from("int").unwrap());
/// assert_eq!(Form::Integral, Form::try_from("integral").unwrap());
/// assert_eq!(Form::Differential, Form::try_from("dif").unwrap());
/// assert_eq!(Form::Differential, Form::try_from("diff").unwrap());
/// assert_eq!(Form::Differential, Form::try_from("differential").unwrap());
///
/// assert!(Form::try_from("lethargy").is_err());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    /// Total per bin
    #[default]
    Integral,
    /// Density per unit width
    Differential,
}

impl Form {
    /// Shortened name i.e. 'int', 'dif'
    pub fn short_name(&self) -> &str {
        match self {
            Form::Integral => "int",
            Form::Differential => "dif",
        }
    }
}

impl TryFrom<&str> for Form {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "int" | "integral" => Ok(Form::Integral),
            "dif" | "diff" | "differential" => Ok(Form::Differential),
            _ => Err(Error::FailedToInferForm(s.to_string())),
        }
    }
}

impl std::fmt::Display for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Coordinate layout for plotting a spectrum
///
/// Rendering is left to whatever plotting library the caller prefers, this
/// only decides where the points go.
///
/// ```rust
/// # use origami_spectrum::PlotStyle;
/// assert_eq!(PlotStyle::Step, PlotStyle::try_from("plot").unwrap());
/// assert_eq!(PlotStyle::ErrorBar, PlotStyle::try_from("errorbar").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStyle {
    /// Histogram outline, two points per bin at the lower and upper edge
    Step,
    /// One point per bin at the midpoint, with error bars
    ErrorBar,
}

impl TryFrom<&str> for PlotStyle {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "plot" | "step" => Ok(PlotStyle::Step),
            "errorbar" | "error_bar" | "midpoint" => Ok(PlotStyle::ErrorBar),
            _ => Err(Error::FailedToInferPlotStyle(s.to_string())),
        }
    }
}

/// Plot coordinates generated from a spectrum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    /// Horizontal coordinates
    pub x: Vec<f64>,
    /// Vertical coordinates
    pub y: Vec<f64>,
    /// Symmetric error on `y`, only for [PlotStyle::ErrorBar]
    pub yerr: Option<Vec<f64>>,
}
