//! Two-column text export.
//!
//! Output uses the same layout the ingest reads back: one `x y` pair per line
//! in scientific notation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;

/// Write `(x, y)` pairs to `path`, one per line.
pub fn write_columns<I>(path: &Path, rows: I) -> Result<usize, AppError>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create output '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    let mut written = 0usize;
    for (x, y) in rows {
        writeln!(out, "{x:.6e} {y:.6e}")
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
        written += 1;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;

    Ok(written)
}
