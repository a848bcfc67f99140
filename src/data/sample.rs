//! Synthetic measurement generation.
//!
//! Evenly spaced x on `[x_min, x_max]`, y from the model plus optional
//! additive Gaussian noise. Generation is deterministic for a given seed.

use log::debug;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ModelKind, Series};
use crate::error::AppError;
use crate::models::predict;

#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub x_min: f64,
    pub x_max: f64,
    pub n_points: usize,
    /// Standard deviation of the additive noise; `0` for exact data.
    pub noise_sigma: f64,
    pub seed: u64,
}

impl SampleSpec {
    /// Defaults for `model`: its default guess as truth, default x range, no noise.
    pub fn for_model(model: ModelKind) -> Self {
        let (x_min, x_max) = model.default_x_range();
        Self {
            model,
            params: model.default_guess(),
            x_min,
            x_max,
            n_points: 301,
            noise_sigma: 0.0,
            seed: 42,
        }
    }
}

pub fn generate_sample(spec: &SampleSpec) -> Result<Series, AppError> {
    if spec.params.len() != spec.model.n_params() {
        return Err(AppError::new(
            3,
            format!(
                "{} expects {} parameters, got {}.",
                spec.model.display_name(),
                spec.model.n_params(),
                spec.params.len()
            ),
        ));
    }
    if spec.n_points == 0 {
        return Err(AppError::new(3, "Sample count must be > 0."));
    }
    if !(spec.x_min.is_finite() && spec.x_max.is_finite() && spec.x_max > spec.x_min) {
        return Err(AppError::new(3, "Invalid x range for sample generation."));
    }
    if !(spec.noise_sigma.is_finite() && spec.noise_sigma >= 0.0) {
        return Err(AppError::new(3, "Noise sigma must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise_sigma)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut series = Series::default();
    let span = spec.x_max - spec.x_min;
    let denom = (spec.n_points.max(2) - 1) as f64;
    for i in 0..spec.n_points {
        let x = spec.x_min + span * i as f64 / denom;
        let mut y = predict(spec.model, x, &spec.params);
        if spec.noise_sigma > 0.0 {
            y += normal.sample(&mut rng);
        }
        series.push(x, y);
    }

    debug!(
        "generated {} {} samples on [{}, {}] (noise sigma {})",
        spec.n_points,
        spec.model.display_name(),
        spec.x_min,
        spec.x_max,
        spec.noise_sigma
    );
    Ok(series)
}
