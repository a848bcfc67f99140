//! `nlls-fit` library crate.
//!
//! Gauss-Newton nonlinear least squares for small parametric models, with the
//! two models used in plasma diagnostics: a Gaussian line on a background (LIF
//! spectra) and a saturating tanh (double-probe I-V traces).
//!
//! The binary (`nlls`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the solver and models are reusable on in-memory data
//!
//! Layout:
//!
//! - `linalg`: dense row-major multiply, transpose, LU inversion
//! - `models`: the model contract and its instances
//! - `fit`: the Gauss-Newton solver and batch fitting
//! - `io`, `data`, `report`, `plot`: collaborators used by the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod linalg;
pub mod models;
pub mod plot;
pub mod report;
