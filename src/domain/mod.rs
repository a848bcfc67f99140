//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the runtime model selector (`ModelKind`)
//! - owned measurement series (`Series`)
//! - curve sampling policy and run configuration (`CurveSampling`, `FitConfig`)
//! - per-input fit results (`FitOutcome`) and serializable reports (`FitReport`, `ParamReport`)

pub mod types;

pub use types::*;
