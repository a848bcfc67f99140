//! Reporting utilities: residuals, JSON report assembly, and formatted terminal output.

pub mod format;

pub use format::*;

use chrono::Utc;

use crate::domain::{FitOutcome, FitReport, ModelKind, ParamReport, Series};
use crate::fit::GaussNewtonSettings;
use crate::models::predict;

/// Root-mean-square of `y - f(x; params)` over the series.
///
/// Returns NaN for an empty series or when any prediction is non-finite.
pub fn rms_residual(kind: ModelKind, params: &[f64], series: &Series) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    let sse: f64 = series
        .points()
        .map(|(x, y)| {
            let r = y - predict(kind, x, params);
            r * r
        })
        .sum();
    (sse / series.len() as f64).sqrt()
}

/// Turn a fit outcome into its serializable report.
pub fn build_report(outcome: &FitOutcome, settings: &GaussNewtonSettings) -> FitReport {
    let kind = outcome.model;
    let params = kind
        .param_names()
        .iter()
        .zip(kind.param_labels())
        .enumerate()
        .map(|(i, (name, (label, unit)))| ParamReport {
            name: (*name).to_string(),
            label: (*label).to_string(),
            unit: (*unit).to_string(),
            initial: outcome.initial.get(i).copied().unwrap_or(f64::NAN),
            fitted: outcome.params.get(i).copied().unwrap_or(f64::NAN),
        })
        .collect();

    let (iterations, residual_norm, converged, error) = match &outcome.result {
        Ok(summary) => (summary.iterations, Some(summary.residual_norm), summary.converged, None),
        Err(err) => (err.iteration().unwrap_or(0), None, false, Some(err.to_string())),
    };

    FitReport {
        tool: "nlls".to_string(),
        generated_at: Utc::now(),
        input: Some(outcome.input.clone()),
        model: kind,
        display_name: kind.display_name().to_string(),
        success: outcome.result.is_ok(),
        error,
        params,
        iterations,
        residual_norm,
        converged,
        max_iter: settings.max_iter,
        tolerance: settings.tolerance,
        n_points: outcome.series.len(),
        rms_residual: Some(rms_residual(kind, &outcome.params, &outcome.series)).filter(|v| v.is_finite()),
        curve_file: outcome.curve_file.clone(),
    }
}
