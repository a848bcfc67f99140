//! Matrix product, transpose and a diagnostic dump.

use super::{LinalgError, check_len};

/// Compute `C = A * B` with `A` being `m × k` and `B` being `k2 × n`.
///
/// Fails without touching `c` if the inner dimensions differ or a buffer does
/// not match its declared shape.
pub fn multiply(
    a: &[f64],
    a_rows: usize,
    a_cols: usize,
    b: &[f64],
    b_rows: usize,
    b_cols: usize,
    c: &mut [f64],
) -> Result<(), LinalgError> {
    if a_cols != b_rows {
        return Err(LinalgError::DimensionMismatch {
            op: "multiply",
            expected: a_cols,
            actual: b_rows,
        });
    }
    check_len("multiply (A)", a, a_rows * a_cols)?;
    check_len("multiply (B)", b, b_rows * b_cols)?;
    check_len("multiply (C)", c, a_rows * b_cols)?;

    for row in 0..a_rows {
        let a_row = &a[row * a_cols..(row + 1) * a_cols];
        for col in 0..b_cols {
            let mut dot = 0.0;
            for (l, &a_rl) in a_row.iter().enumerate() {
                dot += a_rl * b[l * b_cols + col];
            }
            c[row * b_cols + col] = dot;
        }
    }

    Ok(())
}

/// Write the transpose of the `rows × cols` matrix `a` into `out` (`cols × rows`).
pub fn transpose(a: &[f64], rows: usize, cols: usize, out: &mut [f64]) -> Result<(), LinalgError> {
    check_len("transpose (A)", a, rows * cols)?;
    check_len("transpose (out)", out, rows * cols)?;

    for row in 0..rows {
        for col in 0..cols {
            out[col * rows + row] = a[row * cols + col];
        }
    }

    Ok(())
}

/// Render a matrix for diagnostics: one line per row, fixed-width scientific entries.
pub fn format_matrix(a: &[f64], rows: usize, cols: usize) -> String {
    let mut out = String::new();
    for row in 0..rows {
        for col in 0..cols {
            match a.get(row * cols + col) {
                Some(v) => out.push_str(&format!("{v:>14.6e}")),
                None => out.push_str(&format!("{:>14}", "?")),
            }
        }
        out.push('\n');
    }
    out
}

/// Write [`format_matrix`] output to stdout.
pub fn print_matrix(a: &[f64], rows: usize, cols: usize) {
    print!("{}", format_matrix(a, rows, cols));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_known_product() {
        // [1 2 3]   [ 7  8]   [ 58  64]
        // [4 5 6] * [ 9 10] = [139 154]
        //           [11 12]
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut c = [0.0; 4];
        multiply(&a, 2, 3, &b, 3, 2, &mut c).unwrap();
        assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn multiply_matrix_by_column_vector() {
        let a = [2.0, 0.0, 1.0, 3.0];
        let v = [1.0, -1.0];
        let mut out = [0.0; 2];
        multiply(&a, 2, 2, &v, 2, 1, &mut out).unwrap();
        assert_eq!(out, [2.0, -2.0]);
    }

    #[test]
    fn multiply_rejects_inner_dimension_mismatch_without_writing() {
        let a = [1.0; 6];
        let b = [1.0; 6];
        let mut c = [-1.0; 4];
        let err = multiply(&a, 2, 3, &b, 2, 3, &mut c).unwrap_err();
        assert_eq!(
            err,
            LinalgError::DimensionMismatch {
                op: "multiply",
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(c, [-1.0; 4]);
    }

    #[test]
    fn multiply_rejects_short_output_buffer() {
        let a = [1.0; 4];
        let b = [1.0; 4];
        let mut c = [0.0; 3];
        assert!(matches!(
            multiply(&a, 2, 2, &b, 2, 2, &mut c),
            Err(LinalgError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn transpose_rectangular() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut t = [0.0; 6];
        transpose(&a, 2, 3, &mut t).unwrap();
        assert_eq!(t, [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let mut back = [0.0; 6];
        transpose(&t, 3, 2, &mut back).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn format_matrix_one_line_per_row() {
        let txt = format_matrix(&[1.0, -2.5, 0.0, 1e-9], 2, 2);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "    1.000000e0   -2.500000e0");
        assert_eq!(lines[1], "    0.000000e0   1.000000e-9");

        // Short buffers render the missing entries instead of panicking.
        assert!(format_matrix(&[1.0], 1, 2).contains('?'));
        print_matrix(&[1.0, 2.0], 1, 2);
    }
}
