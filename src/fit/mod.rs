//! Curve fitting.
//!
//! Responsibilities:
//!
//! - run Gauss-Newton iterations against any `FitModel`
//! - fit many independent series in parallel

pub mod batch;
pub mod gauss_newton;

pub use batch::*;
pub use gauss_newton::*;

pub use crate::error::FitError;
