//! Independent fits over many series.
//!
//! Each series gets its own parameter vector (seeded from the shared initial
//! guess) and its own workspace, so fits run in parallel without sharing any
//! mutable state. Results keep input order.

use rayon::prelude::*;

use crate::domain::Series;
use crate::error::FitError;
use crate::fit::{FitSummary, GaussNewtonSettings, fit_gauss_newton};
use crate::models::FitModel;

/// Outcome of one series in a batch.
#[derive(Debug, Clone)]
pub struct BatchFit<const NPAR: usize> {
    /// Initial guess on entry, fitted values after a successful fit, and
    /// the last good iterate after a failure.
    pub params: [f64; NPAR],
    pub result: Result<FitSummary, FitError>,
}

pub fn fit_many<M, const NPAR: usize>(
    model: &M,
    series: &[Series],
    initial: &[f64; NPAR],
    settings: &GaussNewtonSettings,
) -> Vec<BatchFit<NPAR>>
where
    M: FitModel<NPAR> + Sync,
{
    series
        .par_iter()
        .map(|s| {
            let mut params = *initial;
            let result = fit_gauss_newton(model, &s.x, &s.y, &mut params, settings);
            BatchFit { params, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TanhModel;
    use approx::assert_relative_eq;

    fn tanh_series(te: f64) -> Series {
        let x: Vec<f64> = (0..121).map(|i| -30.0 + 0.5 * i as f64).collect();
        let p = [3.3e-6, te];
        let y = x.iter().map(|&xi| TanhModel.value(xi, &p)).collect();
        Series::new(x, y)
    }

    #[test]
    fn results_follow_input_order() {
        let temps = [1.5, 2.0, 3.0, 4.5, 6.0, 2.5];
        let series: Vec<Series> = temps.iter().map(|&te| tanh_series(te)).collect();
        let fits = fit_many(&TanhModel, &series, &[3.0e-6, 3.0], &GaussNewtonSettings::default());

        assert_eq!(fits.len(), temps.len());
        for (fit, &te) in fits.iter().zip(temps.iter()) {
            assert!(fit.result.as_ref().is_ok_and(|s| s.converged));
            assert_relative_eq!(fit.params[1], te, max_relative = 1e-6);
        }
    }

    #[test]
    fn one_bad_series_does_not_affect_the_rest() {
        let series = vec![
            tanh_series(3.0),
            Series::new(vec![1.0, 2.0], vec![1.0]),
            tanh_series(2.0),
        ];
        let fits = fit_many(&TanhModel, &series, &[3.0e-6, 2.8], &GaussNewtonSettings::default());

        assert!(fits[0].result.is_ok());
        assert_eq!(
            fits[1].result.as_ref().unwrap_err(),
            &FitError::DimensionMismatch { x_len: 2, y_len: 1 }
        );
        assert_eq!(fits[1].params, [3.0e-6, 2.8]);
        assert!(fits[2].result.is_ok());
    }
}
