//! Fitted curve output.
//!
//! The fitted curve for `run1.dat` goes to `run1_fit.dat` next to it.
//! Two sampling policies exist (see `CurveSampling`):
//!
//! - a fixed step from the first input x up to (excluding) the largest x
//! - the input x values themselves, in input order

use std::path::{Path, PathBuf};

use crate::domain::{CurveSampling, ModelKind, Series};
use crate::error::AppError;
use crate::io::export::write_columns;
use crate::models::predict;

/// Upper bound on the number of points a stepped curve may produce.
pub const MAX_CURVE_POINTS: usize = 50_000_000;

/// `dir/name.ext` -> `dir/name_fit.dat`.
pub fn fit_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push("_fit.dat");
    input.with_file_name(name)
}

/// Evaluate the fitted model following `sampling`.
pub fn sample_curve(
    kind: ModelKind,
    params: &[f64],
    series: &Series,
    sampling: CurveSampling,
) -> Result<Vec<(f64, f64)>, AppError> {
    match sampling {
        CurveSampling::AtInputs => Ok(series
            .x
            .iter()
            .map(|&x| (x, predict(kind, x, params)))
            .collect()),
        CurveSampling::Step { step } => {
            if !(step.is_finite() && step > 0.0) {
                return Err(AppError::new(3, format!("Curve step must be positive, got {step}.")));
            }
            let (Some(&x_start), Some((_, x_end))) = (series.x.first(), series.x_range()) else {
                return Ok(Vec::new());
            };
            if x_end <= x_start {
                return Ok(Vec::new());
            }

            let estimate = ((x_end - x_start) / step).ceil();
            if estimate > MAX_CURVE_POINTS as f64 {
                return Err(AppError::new(
                    3,
                    format!(
                        "Curve step {step} over [{x_start}, {x_end}) gives {estimate:.0} points (limit {MAX_CURVE_POINTS})."
                    ),
                ));
            }

            // x is recomputed from the index to avoid accumulating rounding.
            let mut points = Vec::with_capacity(estimate as usize);
            for i in 0usize.. {
                let x = x_start + i as f64 * step;
                if x >= x_end {
                    break;
                }
                points.push((x, predict(kind, x, params)));
            }
            Ok(points)
        }
    }
}

/// Sample and write the fitted curve. Returns the number of lines written.
pub fn write_fit_curve(
    path: &Path,
    kind: ModelKind,
    params: &[f64],
    series: &Series,
    sampling: CurveSampling,
) -> Result<usize, AppError> {
    let points = sample_curve(kind, params, series, sampling)?;
    write_columns(path, points)
}
