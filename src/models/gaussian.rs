//! Gaussian line on a constant background.
//!
//! `y = A * exp(-0.5 * (x - x0)^2 / sigma2) + B`
//!
//! Used for laser-induced-fluorescence spectra where `x0` is the line centre,
//! `sigma2` the Doppler-broadened variance, `A` the peak counts and `B` the
//! background level.
//!
//! No guard is applied for `sigma2 == 0`: the partials then evaluate to
//! NaN and the normal-matrix inversion rejects the iteration.

use super::model::{FitModel, Partial};
use crate::domain::ModelKind;

pub const X0: usize = 0;
pub const SIGMA2: usize = 1;
pub const AMPLITUDE: usize = 2;
pub const OFFSET: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianModel;

#[inline]
fn envelope(x: f64, p: &[f64; 4]) -> f64 {
    let d = x - p[X0];
    (-0.5 * d * d / p[SIGMA2]).exp()
}

pub fn d_x0(x: f64, p: &[f64; 4]) -> f64 {
    p[AMPLITUDE] * (x - p[X0]) * envelope(x, p) / p[SIGMA2]
}

pub fn d_sigma2(x: f64, p: &[f64; 4]) -> f64 {
    let d = x - p[X0];
    p[AMPLITUDE] * 0.5 * d * d * envelope(x, p) / (p[SIGMA2] * p[SIGMA2])
}

pub fn d_amplitude(x: f64, p: &[f64; 4]) -> f64 {
    envelope(x, p)
}

pub fn d_offset(_x: f64, _p: &[f64; 4]) -> f64 {
    1.0
}

impl FitModel<4> for GaussianModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Gaussian
    }

    fn param_names(&self) -> [&'static str; 4] {
        ["x0", "sigma2", "amplitude", "offset"]
    }

    fn value(&self, x: f64, params: &[f64; 4]) -> f64 {
        params[AMPLITUDE] * envelope(x, params) + params[OFFSET]
    }

    fn partials(&self) -> [Partial<4>; 4] {
        [d_x0, d_sigma2, d_amplitude, d_offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: [f64; 4] = [668.6138, 6.0e-7, 4.0, 0.5];

    #[test]
    fn value_at_centre_is_peak_plus_background() {
        assert_relative_eq!(GaussianModel.value(P[X0], &P), 4.5, epsilon = 1e-12);
    }

    #[test]
    fn value_is_symmetric_about_centre() {
        let d = 5.0e-4;
        let left = GaussianModel.value(P[X0] - d, &P);
        let right = GaussianModel.value(P[X0] + d, &P);
        assert_relative_eq!(left, right, max_relative = 1e-9);
    }

    #[test]
    fn partials_match_central_differences() {
        let model = GaussianModel;
        let partials = model.partials();
        let steps = [5.0e-8, 6.0e-12, 1.0e-6, 1.0e-6];
        for &x in &[668.6128, 668.6135, 668.6138, 668.6146] {
            for (i, partial) in partials.iter().enumerate() {
                let h = steps[i];
                let mut plus = P;
                let mut minus = P;
                plus[i] += h;
                minus[i] -= h;
                let numeric = (model.value(x, &plus) - model.value(x, &minus)) / (2.0 * h);
                let analytic = partial(x, &P);
                assert_relative_eq!(analytic, numeric, epsilon = 1e-4, max_relative = 1e-4);
            }
        }
    }

    #[test]
    fn zero_variance_gives_non_finite_partials() {
        let p = [1.0, 0.0, 2.0, 0.0];
        assert!(d_x0(1.0, &p).is_nan());
        assert!(d_sigma2(1.0, &p).is_nan());
    }
}
