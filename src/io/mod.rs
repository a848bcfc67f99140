//! Input/output helpers.
//!
//! - two-column text ingest + validation (`ingest`)
//! - fitted curve sampling and output naming (`curve`)
//! - two-column text export (`export`)
//! - JSON fit reports (`report_json`)

pub mod curve;
pub mod export;
pub mod ingest;
pub mod report_json;

pub use curve::*;
pub use export::*;
pub use ingest::*;
pub use report_json::*;
