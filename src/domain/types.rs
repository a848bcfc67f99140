//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for display (`nlls show`)

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::fit::{FitSummary, GaussNewtonSettings};

/// Which model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Gaussian line plus constant background (LIF spectra).
    Gaussian,
    /// `Isat * tanh(0.5 V / Te)` (double-probe I–V traces).
    Tanh,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Gaussian => "Gaussian + offset",
            ModelKind::Tanh => "tanh (double probe)",
        }
    }

    pub fn n_params(self) -> usize {
        self.param_names().len()
    }

    /// Parameter names in parameter-vector order.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Gaussian => &["x0", "sigma2", "amplitude", "offset"],
            ModelKind::Tanh => &["isat", "te"],
        }
    }

    /// Descriptive labels and units, in parameter-vector order.
    pub fn param_labels(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ModelKind::Gaussian => &[
                ("Rest wavelength", "nm"),
                ("Sigma^2", "nm^2"),
                ("Amplitude", ""),
                ("Background", ""),
            ],
            ModelKind::Tanh => &[
                ("Ion saturation current", "A"),
                ("Electron temperature", "eV"),
            ],
        }
    }

    /// Initial guess used when none is supplied.
    pub fn default_guess(self) -> Vec<f64> {
        match self {
            ModelKind::Gaussian => vec![668.6138, 6.0e-7, 4.0, 0.5],
            ModelKind::Tanh => vec![3.3e-6, 3.0],
        }
    }

    /// Default x range for synthetic samples.
    pub fn default_x_range(self) -> (f64, f64) {
        match self {
            ModelKind::Gaussian => (668.6100, 668.6176),
            ModelKind::Tanh => (-30.0, 30.0),
        }
    }

    pub fn default_sampling(self) -> CurveSampling {
        match self {
            ModelKind::Gaussian => CurveSampling::Step { step: 1.0e-4 },
            ModelKind::Tanh => CurveSampling::AtInputs,
        }
    }

    /// Significant digits used in parameter summaries.
    pub fn summary_precision(self) -> usize {
        match self {
            ModelKind::Gaussian => 7,
            ModelKind::Tanh => 3,
        }
    }
}

/// An ordered set of `(x, y)` measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// `(min, max)` of the independent variable, if any finite value exists.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        min_max(&self.x)
    }

    pub fn y_range(&self) -> Option<(f64, f64)> {
        min_max(&self.y)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo <= hi { Some((lo, hi)) } else { None }
}

/// Where the fitted curve is evaluated when it is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CurveSampling {
    /// From the first input x up to (excluding) the largest input x.
    Step { step: f64 },
    /// At each input x, in input order.
    AtInputs,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub model: ModelKind,
    pub inputs: Vec<PathBuf>,
    pub initial: Vec<f64>,
    pub settings: GaussNewtonSettings,
    pub sampling: CurveSampling,
    pub write_curve: bool,
    pub report_json: Option<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

/// Result of fitting one input, before it is turned into a report.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub input: PathBuf,
    pub model: ModelKind,
    pub series: Series,
    pub initial: Vec<f64>,
    /// Fitted values on success, the last good iterate on failure.
    pub params: Vec<f64>,
    pub result: Result<FitSummary, FitError>,
    pub curve_file: Option<PathBuf>,
}

impl FitOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// One fitted parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamReport {
    pub name: String,
    pub label: String,
    pub unit: String,
    pub initial: f64,
    pub fitted: f64,
}

/// Outcome of one fit, in a form suitable for JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub input: Option<PathBuf>,
    pub model: ModelKind,
    pub display_name: String,
    pub success: bool,
    pub error: Option<String>,
    pub params: Vec<ParamReport>,
    pub iterations: usize,
    /// Last squared step norm; absent when the fit failed.
    pub residual_norm: Option<f64>,
    pub converged: bool,
    pub max_iter: usize,
    pub tolerance: f64,
    pub n_points: usize,
    pub rms_residual: Option<f64>,
    pub curve_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_guesses_line_up_with_names() {
        for kind in [ModelKind::Gaussian, ModelKind::Tanh] {
            assert_eq!(kind.param_labels().len(), kind.n_params());
            assert_eq!(kind.default_guess().len(), kind.n_params());
        }
    }

    #[test]
    fn series_ranges_ignore_non_finite() {
        let s = Series::new(vec![3.0, f64::NAN, -1.0], vec![0.0, 1.0, 2.0]);
        assert_eq!(s.x_range(), Some((-1.0, 3.0)));
        assert_eq!(s.y_range(), Some((0.0, 2.0)));
        assert_eq!(Series::default().x_range(), None);
    }

    #[test]
    fn sampling_serializes_with_mode_tag() {
        let json = serde_json::to_string(&CurveSampling::Step { step: 0.5 }).unwrap();
        assert_eq!(json, r#"{"mode":"step","step":0.5}"#);
        let back: CurveSampling = serde_json::from_str(r#"{"mode":"at_inputs"}"#).unwrap();
        assert_eq!(back, CurveSampling::AtInputs);
    }
}
