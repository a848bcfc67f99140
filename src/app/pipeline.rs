//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place keeps the workflow testable without the binary:
//! ingest -> parameter checks -> parallel fits -> fitted curve output
//!
//! The front-end then only handles presentation.

use std::path::PathBuf;

use log::{info, warn};

use crate::domain::{CurveSampling, FitConfig, FitOutcome, ModelKind, Series};
use crate::error::AppError;
use crate::fit::fit_many;
use crate::io::{fit_output_path, read_two_column, write_fit_curve};
use crate::models::{FitModel, GaussianModel, TanhModel};

/// Read every input, fit it, and write fitted curves as configured.
///
/// Input and configuration errors abort the run. Individual fit failures do
/// not; they are recorded in the returned outcomes.
pub fn run_fits(config: &FitConfig) -> Result<Vec<FitOutcome>, AppError> {
    if config.inputs.is_empty() {
        return Err(AppError::new(3, "No input files given."));
    }
    config
        .settings
        .validate()
        .map_err(|e| AppError::new(3, e.to_string()))?;
    if let CurveSampling::Step { step } = config.sampling {
        if !(step.is_finite() && step > 0.0) {
            return Err(AppError::new(3, format!("Curve step must be positive, got {step}.")));
        }
    }

    let mut paths = Vec::with_capacity(config.inputs.len());
    let mut series = Vec::with_capacity(config.inputs.len());
    for path in &config.inputs {
        let ingested = read_two_column(path)?;
        info!(
            "'{}': {} points ({} rows rejected)",
            path.display(),
            ingested.rows_used(),
            ingested.row_errors.len()
        );
        paths.push(path.clone());
        series.push(ingested.series);
    }

    match config.model {
        ModelKind::Gaussian => fit_all_with::<_, 4>(&GaussianModel, config, paths, series),
        ModelKind::Tanh => fit_all_with::<_, 2>(&TanhModel, config, paths, series),
    }
}

fn fit_all_with<M, const NPAR: usize>(
    model: &M,
    config: &FitConfig,
    paths: Vec<PathBuf>,
    series: Vec<Series>,
) -> Result<Vec<FitOutcome>, AppError>
where
    M: FitModel<NPAR> + Sync,
{
    let kind = model.kind();
    let initial: [f64; NPAR] = config.initial.as_slice().try_into().map_err(|_| {
        AppError::new(
            3,
            format!(
                "{} expects {} initial parameters ({}), got {}.",
                kind.display_name(),
                NPAR,
                model.param_names().join(", "),
                config.initial.len()
            ),
        )
    })?;
    model
        .validate(&initial)
        .map_err(|e| AppError::new(3, format!("Invalid initial guess: {e}")))?;

    let fits = fit_many(model, &series, &initial, &config.settings);

    let mut outcomes = Vec::with_capacity(fits.len());
    for ((input, series), fit) in paths.into_iter().zip(series).zip(fits) {
        let curve_file = match &fit.result {
            Ok(_) if config.write_curve => {
                let out = fit_output_path(&input);
                let n = write_fit_curve(&out, kind, &fit.params, &series, config.sampling)?;
                info!("wrote {n} fitted points to '{}'", out.display());
                Some(out)
            }
            Ok(_) => None,
            Err(err) => {
                warn!("'{}': {err}", input.display());
                None
            }
        };

        outcomes.push(FitOutcome {
            input,
            model: kind,
            series,
            initial: initial.to_vec(),
            params: fit.params.to_vec(),
            result: fit.result,
            curve_file,
        });
    }
    Ok(outcomes)
}

/// Map the first failed fit (if any) to the run's error.
pub fn first_failure(outcomes: &[FitOutcome]) -> Result<(), AppError> {
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    let Some((outcome, err)) = outcomes
        .iter()
        .find_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    else {
        return Ok(());
    };

    Err(AppError::new(
        err.exit_code(),
        format!(
            "{failed} of {} fit(s) failed; first: '{}': {err}",
            outcomes.len(),
            outcome.input.display()
        ),
    ))
}
