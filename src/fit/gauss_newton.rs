//! Gauss-Newton nonlinear least squares.
//!
//! Each iteration:
//!
//! 1. builds the residual `dF = y - f(x; p)` and the Jacobian `A` (one row per
//!    point, one column per parameter, in model parameter order)
//! 2. forms the normal matrix `a = Aᵗ A` and inverts it
//! 3. takes the full step `dp = a⁻¹ Aᵗ dF` (no damping, no line search)
//! 4. records `R2 = |dp|²` and stops once it is at or below the tolerance
//!
//! `R2[0]` is seeded with `1.0`, so at least one iteration runs for any
//! tolerance below one.
//!
//! Exhausting `max_iter` is reported as a completed fit. Callers that care
//! must check [`FitSummary::converged`] or the iteration count. Only kernel
//! failures (and a non-finite step) abort the call; the parameter vector then
//! holds the values from before the failing iteration.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::linalg::{LinalgError, LuWorkspace, format_matrix, multiply, transpose, try_zeroed};
use crate::models::FitModel;

/// Iteration cap and convergence tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussNewtonSettings {
    /// Maximum number of Gauss-Newton steps.
    pub max_iter: usize,
    /// Threshold on the squared step norm.
    pub tolerance: f64,
}

impl Default for GaussNewtonSettings {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tolerance: 1.0e-8,
        }
    }
}

impl GaussNewtonSettings {
    pub fn validate(&self) -> Result<(), FitError> {
        if self.max_iter == 0 {
            return Err(FitError::InvalidSettings("max_iter must be at least 1".into()));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(FitError::InvalidSettings(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Diagnostics of a completed fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    /// Number of steps applied to the parameter vector.
    pub iterations: usize,
    /// Last recorded squared step norm.
    pub residual_norm: f64,
    /// Whether `residual_norm <= tolerance` when the loop stopped.
    pub converged: bool,
    /// Squared step norm per iteration; `trace[0]` is the seed value.
    pub trace: Vec<f64>,
}

/// Working buffers for one fit call, sized for `npoints × npar`.
///
/// Allocated once up front so the iteration loop itself never allocates.
#[derive(Debug)]
pub struct GaussNewtonWorkspace {
    npoints: usize,
    npar: usize,
    jacobian: Vec<f64>,
    jacobian_t: Vec<f64>,
    normal: Vec<f64>,
    normal_inv: Vec<f64>,
    residual: Vec<f64>,
    rhs: Vec<f64>,
    step: Vec<f64>,
    lu: LuWorkspace,
    trace: Vec<f64>,
}

impl GaussNewtonWorkspace {
    pub fn try_new(npoints: usize, npar: usize, max_iter: usize) -> Result<Self, FitError> {
        let build = || -> Result<Self, LinalgError> {
            let trace_len = max_iter.saturating_add(1);
            let mut trace = Vec::new();
            trace
                .try_reserve_exact(trace_len)
                .map_err(|_| LinalgError::Allocation { len: trace_len })?;
            Ok(Self {
                npoints,
                npar,
                jacobian: try_zeroed(npoints * npar)?,
                jacobian_t: try_zeroed(npar * npoints)?,
                normal: try_zeroed(npar * npar)?,
                normal_inv: try_zeroed(npar * npar)?,
                residual: try_zeroed(npoints)?,
                rhs: try_zeroed(npar)?,
                step: try_zeroed(npar)?,
                lu: LuWorkspace::try_new(npar)?,
                trace,
            })
        };
        build().map_err(FitError::Allocation)
    }

    /// Normal matrix `AᵗA` of the most recent iteration.
    pub fn normal_matrix(&self) -> &[f64] {
        &self.normal
    }

    /// Run the iteration on `x`/`y`, updating `params` in place.
    pub fn run<M, const NPAR: usize>(
        &mut self,
        model: &M,
        x: &[f64],
        y: &[f64],
        params: &mut [f64; NPAR],
        settings: &GaussNewtonSettings,
    ) -> Result<FitSummary, FitError>
    where
        M: FitModel<NPAR> + ?Sized,
    {
        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.len() != self.npoints || NPAR != self.npar {
            return Err(FitError::Kernel {
                iteration: 0,
                source: LinalgError::DimensionMismatch {
                    op: "gauss-newton workspace",
                    expected: self.npoints * self.npar,
                    actual: x.len() * NPAR,
                },
            });
        }
        settings.validate()?;
        model.validate(params)?;

        let n = self.npoints;
        let partials = model.partials();
        let Self {
            jacobian,
            jacobian_t,
            normal,
            normal_inv,
            residual,
            rhs,
            step,
            lu,
            trace,
            ..
        } = self;

        info!(
            "{}: fitting {n} points (max_iter={}, tol={:.1e})",
            model.kind().display_name(),
            settings.max_iter,
            settings.tolerance
        );
        trace.clear();
        trace.push(1.0);
        let mut it = 0usize;

        while it < settings.max_iter && trace[it] > settings.tolerance {
            let iteration = it + 1;
            let kernel = |source: LinalgError| FitError::from_kernel(iteration, source);

            let current: &[f64; NPAR] = params;
            for (row, (&xi, &yi)) in x.iter().zip(y.iter()).enumerate() {
                residual[row] = yi - model.value(xi, current);
                let jrow = &mut jacobian[row * NPAR..(row + 1) * NPAR];
                for (slot, partial) in jrow.iter_mut().zip(partials.iter()) {
                    *slot = partial(xi, current);
                }
            }

            transpose(jacobian, n, NPAR, jacobian_t).map_err(kernel)?;
            multiply(jacobian_t, NPAR, n, jacobian, n, NPAR, normal).map_err(kernel)?;

            if let Err(source) = lu.invert_into(normal, NPAR, normal_inv) {
                error!(
                    "{}: normal matrix inversion failed at iteration {iteration}: {source}\n{}",
                    model.kind().display_name(),
                    format_matrix(normal, NPAR, NPAR)
                );
                return Err(kernel(source));
            }

            multiply(jacobian_t, NPAR, n, residual, n, 1, rhs).map_err(kernel)?;
            multiply(normal_inv, NPAR, NPAR, rhs, NPAR, 1, step).map_err(kernel)?;

            let r2: f64 = step.iter().map(|d| d * d).sum();
            if !r2.is_finite() {
                error!(
                    "{}: non-finite step at iteration {iteration}: {:?}",
                    model.kind().display_name(),
                    step
                );
                return Err(FitError::NonFiniteStep { iteration });
            }

            it = iteration;
            for (p, d) in params.iter_mut().zip(step.iter()) {
                *p += d;
            }
            trace.push(r2);
            debug!("iteration {it}: R2={r2:.6e} params={params:?}");
        }

        let residual_norm = trace[it];
        let converged = residual_norm <= settings.tolerance;
        if converged {
            info!(
                "{}: converged after {it} iterations (R2={residual_norm:.3e})",
                model.kind().display_name()
            );
        } else {
            warn!(
                "{}: iteration cap {} reached without meeting tolerance {:.3e} (R2={residual_norm:.3e})",
                model.kind().display_name(),
                settings.max_iter,
                settings.tolerance
            );
        }

        Ok(FitSummary {
            iterations: it,
            residual_norm,
            converged,
            trace: trace.clone(),
        })
    }
}

/// Fit `model` to `(x, y)` starting from `params`, which is updated in place.
pub fn fit_gauss_newton<M, const NPAR: usize>(
    model: &M,
    x: &[f64],
    y: &[f64],
    params: &mut [f64; NPAR],
    settings: &GaussNewtonSettings,
) -> Result<FitSummary, FitError>
where
    M: FitModel<NPAR> + ?Sized,
{
    if x.len() != y.len() {
        return Err(FitError::DimensionMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    settings.validate()?;
    model.validate(params)?;

    let mut workspace = GaussNewtonWorkspace::try_new(x.len(), NPAR, settings.max_iter)?;
    workspace.run(model, x, y, params, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GaussianModel, TanhModel};
    use approx::assert_relative_eq;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    const GAUSS_TRUTH: [f64; 4] = [668.6138, 6.0e-7, 4.0, 0.5];
    const TANH_TRUTH: [f64; 2] = [3.3e-6, 3.0];

    fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n as f64 - 1.0))
            .collect()
    }

    fn gaussian_data(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x = linspace(668.6100, 668.6176, n);
        let y = x.iter().map(|&xi| GaussianModel.value(xi, &GAUSS_TRUTH)).collect();
        (x, y)
    }

    fn tanh_data(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x = linspace(-30.0, 30.0, n);
        let y = x.iter().map(|&xi| TanhModel.value(xi, &TANH_TRUTH)).collect();
        (x, y)
    }

    #[test]
    fn recovers_gaussian_parameters_from_exact_data() {
        let (x, y) = gaussian_data(400);
        let mut p = [668.6140, 5.0e-7, 3.6, 0.45];
        let summary = fit_gauss_newton(&GaussianModel, &x, &y, &mut p, &Default::default()).unwrap();

        assert!(summary.converged);
        assert!(summary.iterations < 30, "took {} iterations", summary.iterations);
        assert_relative_eq!(p[0], GAUSS_TRUTH[0], max_relative = 1e-10);
        assert_relative_eq!(p[1], GAUSS_TRUTH[1], max_relative = 1e-5);
        assert_relative_eq!(p[2], GAUSS_TRUTH[2], max_relative = 1e-5);
        assert_relative_eq!(p[3], GAUSS_TRUTH[3], max_relative = 1e-5);
    }

    #[test]
    fn recovers_tanh_parameters_from_exact_data() {
        let (x, y) = tanh_data(301);
        let mut p = [3.0e-6, 2.5];
        let summary = fit_gauss_newton(&TanhModel, &x, &y, &mut p, &Default::default()).unwrap();

        assert!(summary.converged);
        assert!(summary.iterations < 30);
        assert_relative_eq!(p[0], TANH_TRUTH[0], max_relative = 1e-6);
        assert_relative_eq!(p[1], TANH_TRUTH[1], max_relative = 1e-6);
    }

    #[test]
    fn point_order_does_not_change_the_fit() {
        let (x, y) = tanh_data(201);
        let mut noisy_y = y.clone();
        let mut rng = StdRng::seed_from_u64(5);
        for v in noisy_y.iter_mut() {
            *v += 1.0e-8 * rng.gen_range(-1.0..1.0);
        }

        let mut order: Vec<usize> = (0..x.len()).collect();
        order.shuffle(&mut rng);
        let xs: Vec<f64> = order.iter().map(|&i| x[i]).collect();
        let ys: Vec<f64> = order.iter().map(|&i| noisy_y[i]).collect();

        let settings = GaussNewtonSettings::default();
        let mut a = [3.0e-6, 2.5];
        let mut b = a;
        fit_gauss_newton(&TanhModel, &x, &noisy_y, &mut a, &settings).unwrap();
        fit_gauss_newton(&TanhModel, &xs, &ys, &mut b, &settings).unwrap();

        assert_relative_eq!(a[0], b[0], max_relative = 1e-7);
        assert_relative_eq!(a[1], b[1], max_relative = 1e-7);
    }

    #[test]
    fn mismatched_lengths_fail_before_iterating() {
        let mut p = TANH_TRUTH;
        let err = fit_gauss_newton(&TanhModel, &[1.0, 2.0, 3.0], &[1.0, 2.0], &mut p, &Default::default())
            .unwrap_err();
        assert_eq!(err, FitError::DimensionMismatch { x_len: 3, y_len: 2 });
        assert_eq!(p, TANH_TRUTH);
    }

    #[test]
    fn fewer_points_than_parameters_is_singular() {
        let mut p = [3.0e-6, 2.5];
        let err = fit_gauss_newton(&TanhModel, &[4.0], &[1.0e-6], &mut p, &Default::default())
            .unwrap_err();
        assert!(matches!(err, FitError::SingularMatrix { iteration: 1, .. }));
        assert_eq!(p, [3.0e-6, 2.5]);
    }

    #[test]
    fn identical_x_values_are_singular_for_gaussian() {
        let x = vec![668.6140; 50];
        let y = vec![3.0; 50];
        let mut p = [668.6138, 6.0e-7, 4.0, 0.5];
        let err = fit_gauss_newton(&GaussianModel, &x, &y, &mut p, &Default::default()).unwrap_err();
        assert!(matches!(err, FitError::SingularMatrix { .. }));
    }

    #[test]
    fn zero_variance_jacobian_is_rejected_by_the_kernel() {
        let (x, y) = gaussian_data(50);
        let mut p = [668.6138, 0.0, 4.0, 0.5];
        let err = fit_gauss_newton(&GaussianModel, &x, &y, &mut p, &Default::default()).unwrap_err();
        assert!(matches!(err, FitError::SingularMatrix { iteration: 1, .. }));
        assert_eq!(p, [668.6138, 0.0, 4.0, 0.5]);
    }

    #[test]
    fn single_iteration_cap_reports_success_without_convergence() {
        let (x, y) = gaussian_data(200);
        let mut p = [668.6140, 5.0e-7, 3.6, 0.45];
        let settings = GaussNewtonSettings {
            max_iter: 1,
            tolerance: 0.0,
        };
        let summary = fit_gauss_newton(&GaussianModel, &x, &y, &mut p, &settings).unwrap();

        assert_eq!(summary.iterations, settings.max_iter);
        assert!(summary.residual_norm > settings.tolerance);
        assert!(!summary.converged);
        assert_eq!(summary.trace.len(), 2);
        assert_eq!(summary.trace[0], 1.0);
    }

    #[test]
    fn tolerance_above_seed_skips_iteration() {
        let (x, y) = tanh_data(20);
        let mut p = [3.0e-6, 2.5];
        let settings = GaussNewtonSettings {
            max_iter: 10,
            tolerance: 1.0,
        };
        let summary = fit_gauss_newton(&TanhModel, &x, &y, &mut p, &settings).unwrap();
        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.residual_norm, 1.0);
        assert_eq!(p, [3.0e-6, 2.5]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let (x, y) = tanh_data(20);
        let mut p = TANH_TRUTH;
        for settings in [
            GaussNewtonSettings { max_iter: 0, tolerance: 1e-8 },
            GaussNewtonSettings { max_iter: 10, tolerance: -1.0 },
            GaussNewtonSettings { max_iter: 10, tolerance: f64::NAN },
        ] {
            let err = fit_gauss_newton(&TanhModel, &x, &y, &mut p, &settings).unwrap_err();
            assert!(matches!(err, FitError::InvalidSettings(_)));
        }
    }

    #[test]
    fn zero_temperature_guess_is_rejected() {
        let (x, y) = tanh_data(20);
        let mut p = [3.3e-6, 0.0];
        let err = fit_gauss_newton(&TanhModel, &x, &y, &mut p, &Default::default()).unwrap_err();
        assert_eq!(err, FitError::InvalidParameter { name: "te", value: 0.0 });
    }

    #[test]
    fn workspace_can_be_reused_across_fits() {
        let (x, y) = tanh_data(101);
        let settings = GaussNewtonSettings::default();
        let mut ws = GaussNewtonWorkspace::try_new(x.len(), 2, settings.max_iter).unwrap();

        let mut first = [3.0e-6, 2.5];
        let mut second = [3.6e-6, 3.4];
        let a = ws.run(&TanhModel, &x, &y, &mut first, &settings).unwrap();
        let b = ws.run(&TanhModel, &x, &y, &mut second, &settings).unwrap();
        assert!(a.converged && b.converged);
        assert_relative_eq!(first[1], second[1], max_relative = 1e-6);
        assert_eq!(b.trace.len(), b.iterations + 1);
    }

    #[test]
    fn workspace_rejects_wrong_shape() {
        let mut ws = GaussNewtonWorkspace::try_new(10, 2, 5).unwrap();
        let (x, y) = tanh_data(11);
        let mut p = TANH_TRUTH;
        let err = ws.run(&TanhModel, &x, &y, &mut p, &Default::default()).unwrap_err();
        assert!(matches!(err, FitError::Kernel { iteration: 0, .. }));
    }

    #[test]
    fn trace_is_monotone_near_the_solution() {
        let (x, y) = tanh_data(101);
        let mut p = [3.25e-6, 2.95];
        let summary = fit_gauss_newton(&TanhModel, &x, &y, &mut p, &Default::default()).unwrap();
        let steps = &summary.trace[1..];
        for w in steps.windows(2) {
            assert!(w[1] <= w[0], "trace increased: {:?}", summary.trace);
        }
    }
}
