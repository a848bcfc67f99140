//! Two-column text ingest.
//!
//! Input files hold one `x y` pair per line, separated by whitespace. Blank
//! lines and lines starting with `#` are skipped. Extra columns are ignored.
//!
//! Rows that cannot be parsed are skipped and reported with their line number
//! rather than aborting the whole read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};

use crate::domain::Series;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

/// Ingest output: accepted points + row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedSeries {
    pub series: Series,
    pub row_errors: Vec<RowError>,
    /// Non-blank, non-comment lines seen.
    pub rows_read: usize,
}

impl IngestedSeries {
    pub fn rows_used(&self) -> usize {
        self.series.len()
    }
}

/// Read a two-column file. Fails if it cannot be read or yields no valid rows.
pub fn read_two_column(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;

    let ingested = parse_two_column(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Failed to read input '{}': {e}", path.display())))?;

    for err in &ingested.row_errors {
        warn!("{}:{}: {}", path.display(), err.line, err.message);
    }
    if ingested.series.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No valid data rows in '{}' ({} rows read, {} rejected).",
                path.display(),
                ingested.rows_read,
                ingested.row_errors.len()
            ),
        ));
    }

    debug!(
        "read {} points from '{}' ({} rejected)",
        ingested.rows_used(),
        path.display(),
        ingested.row_errors.len()
    );
    Ok(ingested)
}

/// Parse two-column text from any buffered reader.
pub fn parse_two_column<R: BufRead>(reader: R) -> std::io::Result<IngestedSeries> {
    let mut out = IngestedSeries::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        out.rows_read += 1;

        match parse_row(trimmed) {
            Ok((x, y)) => out.series.push(x, y),
            Err(message) => out.row_errors.push(RowError { line: idx + 1, message }),
        }
    }

    Ok(out)
}

fn parse_row(line: &str) -> Result<(f64, f64), String> {
    let mut fields = line.split_whitespace();
    let x = parse_field(fields.next(), "x")?;
    let y = parse_field(fields.next(), "y")?;
    Ok((x, y))
}

fn parse_field(field: Option<&str>, name: &str) -> Result<f64, String> {
    let raw = field.ok_or_else(|| format!("missing {name} column"))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("invalid {name} value '{raw}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite {name} value '{raw}'"));
    }
    Ok(v)
}
