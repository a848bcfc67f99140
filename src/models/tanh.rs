//! Saturating hyperbolic tangent for double-probe I–V traces.
//!
//! `I(V) = Isat * tanh(0.5 * V / Te)`
//!
//! with `Isat` the ion saturation current and `Te` the electron temperature
//! in volts. The model is undefined at `Te == 0`, which is rejected up front.

use super::model::{FitModel, Partial};
use crate::domain::ModelKind;
use crate::error::FitError;

pub const ISAT: usize = 0;
pub const TE: usize = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct TanhModel;

pub fn d_isat(x: f64, p: &[f64; 2]) -> f64 {
    (0.5 * x / p[TE]).tanh()
}

pub fn d_te(x: f64, p: &[f64; 2]) -> f64 {
    let t = (0.5 * x / p[TE]).tanh();
    -p[ISAT] * 0.5 * x * (1.0 - t * t) / (p[TE] * p[TE])
}

impl FitModel<2> for TanhModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Tanh
    }

    fn param_names(&self) -> [&'static str; 2] {
        ["isat", "te"]
    }

    fn value(&self, x: f64, params: &[f64; 2]) -> f64 {
        params[ISAT] * (0.5 * x / params[TE]).tanh()
    }

    fn partials(&self) -> [Partial<2>; 2] {
        [d_isat, d_te]
    }

    fn validate(&self, params: &[f64; 2]) -> Result<(), FitError> {
        if !params[ISAT].is_finite() {
            return Err(FitError::InvalidParameter {
                name: "isat",
                value: params[ISAT],
            });
        }
        if !params[TE].is_finite() || params[TE] == 0.0 {
            return Err(FitError::InvalidParameter {
                name: "te",
                value: params[TE],
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: [f64; 2] = [3.3e-6, 3.0];

    #[test]
    fn value_saturates_and_is_odd() {
        let m = TanhModel;
        assert_eq!(m.value(0.0, &P), 0.0);
        assert_relative_eq!(m.value(200.0, &P), P[ISAT], max_relative = 1e-12);
        assert_relative_eq!(m.value(-7.0, &P), -m.value(7.0, &P), max_relative = 1e-15);
    }

    #[test]
    fn partials_match_central_differences() {
        let m = TanhModel;
        let steps = [1e-12, 1e-6];
        for &x in &[-25.0, -4.0, -0.5, 1.0, 6.0, 18.0] {
            for (i, partial) in m.partials().iter().enumerate() {
                let mut plus = P;
                let mut minus = P;
                plus[i] += steps[i];
                minus[i] -= steps[i];
                let numeric = (m.value(x, &plus) - m.value(x, &minus)) / (2.0 * steps[i]);
                assert_relative_eq!(partial(x, &P), numeric, epsilon = 1e-12, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn zero_temperature_is_rejected() {
        let err = TanhModel.validate(&[1.0e-6, 0.0]).unwrap_err();
        assert_eq!(err, FitError::InvalidParameter { name: "te", value: 0.0 });
        assert!(TanhModel.validate(&P).is_ok());
    }
}
