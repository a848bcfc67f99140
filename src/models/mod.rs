//! Parametric fit models.
//!
//! Each model supplies its value and an ordered list of analytic partial
//! derivatives, one per parameter, so that the solver can stay generic.

pub mod gaussian;
pub mod model;
pub mod tanh;

pub use gaussian::GaussianModel;
pub use model::*;
pub use tanh::TanhModel;
