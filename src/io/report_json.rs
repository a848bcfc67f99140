//! Read/write JSON fit reports.
//!
//! A report file holds one `FitReport` per input, in input order. The schema is
//! defined by `domain::FitReport`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::FitReport;
use crate::error::AppError;

/// Write a report JSON file.
pub fn write_reports_json(path: &Path, reports: &[FitReport]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), reports)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Read a report JSON file.
pub fn read_reports_json(path: &Path) -> Result<Vec<FitReport>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let reports: Vec<FitReport> = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(reports)
}
