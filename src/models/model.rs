//! The model contract shared by the solver, the reports and the curve writer.

use crate::domain::ModelKind;
use crate::error::FitError;

/// Partial derivative of a model with respect to one parameter.
pub type Partial<const NPAR: usize> = fn(x: f64, params: &[f64; NPAR]) -> f64;

/// A model with `NPAR` fit parameters.
///
/// `partials()[i]` must be the derivative with respect to `params[i]`; the
/// solver lays out Jacobian columns in exactly this order.
pub trait FitModel<const NPAR: usize> {
    fn kind(&self) -> ModelKind;

    fn param_names(&self) -> [&'static str; NPAR];

    fn value(&self, x: f64, params: &[f64; NPAR]) -> f64;

    fn partials(&self) -> [Partial<NPAR>; NPAR];

    /// Reject parameter vectors the model cannot be evaluated at.
    fn validate(&self, params: &[f64; NPAR]) -> Result<(), FitError> {
        let names = self.param_names();
        for (&name, &value) in names.iter().zip(params.iter()) {
            if !value.is_finite() {
                return Err(FitError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Evaluate `y(x)` for a model selected at runtime.
///
/// # Panics
/// Panics if `params` is shorter than `kind.n_params()`.
pub fn predict(kind: ModelKind, x: f64, params: &[f64]) -> f64 {
    match kind {
        ModelKind::Gaussian => crate::models::GaussianModel.value(
            x,
            &[params[0], params[1], params[2], params[3]],
        ),
        ModelKind::Tanh => crate::models::TanhModel.value(x, &[params[0], params[1]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_dispatches_on_kind() {
        let g = predict(ModelKind::Gaussian, 1.0, &[1.0, 0.5, 2.0, 0.25]);
        assert!((g - 2.25).abs() < 1e-12);

        let t = predict(ModelKind::Tanh, 0.0, &[1.0, 3.0]);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn default_validate_rejects_non_finite() {
        let err = crate::models::GaussianModel
            .validate(&[0.0, 1.0, f64::NAN, 0.0])
            .unwrap_err();
        assert!(matches!(err, FitError::InvalidParameter { name: "amplitude", .. }));
    }
}
