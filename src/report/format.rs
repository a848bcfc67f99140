//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{FitOutcome, FitReport, ModelKind};

/// Format `v` with `digits` significant digits.
///
/// Fixed notation for magnitudes in `[1e-3, 1e6)`, scientific otherwise.
pub fn fmt_sig(v: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if !v.is_finite() {
        return format!("{v}");
    }
    if v == 0.0 {
        return format!("{:.*}", digits - 1, 0.0);
    }
    let mag = v.abs().log10().floor() as i32;
    if (-3..6).contains(&mag) {
        let decimals = (digits as i32 - 1 - mag).max(0) as usize;
        format!("{v:.decimals$}")
    } else {
        format!("{:.*e}", digits - 1, v)
    }
}

/// Labelled parameter block, one line per parameter in model order.
pub fn format_params(title: &str, kind: ModelKind, params: &[f64]) -> String {
    let labels: Vec<String> = kind
        .param_labels()
        .iter()
        .map(|(label, unit)| {
            if unit.is_empty() {
                label.to_string()
            } else {
                format!("{label} [{unit}]")
            }
        })
        .collect();
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(0);

    let mut out = format!("{title}:\n");
    for (label, value) in labels.iter().zip(params.iter()) {
        out.push_str(&format!(
            " {label:<width$} : {}\n",
            fmt_sig(*value, kind.summary_precision())
        ));
    }
    out
}

/// Full summary for one input: data stats, before/after parameters, outcome.
pub fn format_fit_outcome(outcome: &FitOutcome) -> String {
    let kind = outcome.model;
    let mut out = String::new();

    out.push_str(&format!(
        "=== nlls - {} fit: {} ===\n",
        kind.display_name(),
        outcome.input.display()
    ));
    match (outcome.series.x_range(), outcome.series.y_range()) {
        (Some((x0, x1)), Some((y0, y1))) => out.push_str(&format!(
            "Points: n={} | x=[{}, {}] | y=[{}, {}]\n",
            outcome.series.len(),
            fmt_sig(x0, 7),
            fmt_sig(x1, 7),
            fmt_sig(y0, 4),
            fmt_sig(y1, 4)
        )),
        _ => out.push_str(&format!("Points: n={}\n", outcome.series.len())),
    }

    out.push_str(&format_params("Initial fit parameters", kind, &outcome.initial));

    match &outcome.result {
        Ok(summary) => {
            out.push_str(&format!(
                "Curve fit successful! ({} iterations, R2={:.3e})\n",
                summary.iterations, summary.residual_norm
            ));
            if !summary.converged {
                out.push_str("Note: iteration cap reached before the tolerance was met.\n");
            }
            out.push_str(&format_params("Final fit parameters", kind, &outcome.params));
        }
        Err(err) => {
            out.push_str(&format!("Curve fit failed: {err}\n"));
            out.push_str(&format_params("Last parameters", kind, &outcome.params));
        }
    }

    if let Some(path) = &outcome.curve_file {
        out.push_str(&format!("Fit curve written to: {}\n", path.display()));
    }
    out
}

/// One-line tally after a multi-file run.
pub fn format_batch_footer(outcomes: &[FitOutcome]) -> String {
    let ok = outcomes.iter().filter(|o| o.is_success()).count();
    format!("Fits: {} ok, {} failed\n", ok, outcomes.len() - ok)
}

/// Re-render a saved report (`nlls show`).
pub fn format_report_summary(report: &FitReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== {} - {} fit ({}) ===\n",
        report.tool,
        report.display_name,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(input) = &report.input {
        out.push_str(&format!("Input: {}\n", input.display()));
    }
    out.push_str(&format!(
        "Settings: max_iter={} | tol={:.1e}\n",
        report.max_iter, report.tolerance
    ));

    if report.success {
        out.push_str(&format!(
            "Status: ok | iterations={} | R2={} | converged={} | rms={}\n",
            report.iterations,
            fmt_opt(report.residual_norm),
            report.converged,
            fmt_opt(report.rms_residual)
        ));
    } else {
        out.push_str(&format!(
            "Status: failed | {}\n",
            report.error.as_deref().unwrap_or("unknown error")
        ));
    }

    let digits = report.model.summary_precision();
    let width = report.params.iter().map(|p| p.label.len()).max().unwrap_or(0);
    out.push_str("Parameters (initial -> fitted):\n");
    for p in &report.params {
        let unit = if p.unit.is_empty() {
            String::new()
        } else {
            format!(" {}", p.unit)
        };
        out.push_str(&format!(
            " {:<width$} : {} -> {}{unit}\n",
            p.label,
            fmt_sig(p.initial, digits),
            fmt_sig(p.fitted, digits)
        ));
    }
    if let Some(curve) = &report.curve_file {
        out.push_str(&format!("Curve: {}\n", curve.display()));
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.3e}")).unwrap_or_else(|| "-".to_string())
}
