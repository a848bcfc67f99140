//! LU factorization with partial pivoting and explicit inversion.
//!
//! The packed factor keeps `U` on and above the diagonal and the multipliers of
//! `L` (unit diagonal implied) below it. `perm[i]` is the original row that
//! ended up in position `i`.

use super::{LinalgError, check_len, try_zeroed};

/// Relative pivot threshold.
///
/// A pivot is degenerate when its magnitude does not exceed this fraction of
/// the largest entry of the original row it came from.
pub const PIVOT_RTOL: f64 = 1e-12;

/// Reusable buffers for factorizing and inverting `n × n` matrices.
#[derive(Debug, Clone)]
pub struct LuWorkspace {
    n: usize,
    lu: Vec<f64>,
    perm: Vec<usize>,
    row_scale: Vec<f64>,
    col: Vec<f64>,
}

impl LuWorkspace {
    pub fn try_new(n: usize) -> Result<Self, LinalgError> {
        Ok(Self {
            n,
            lu: try_zeroed(n * n)?,
            perm: try_zeroed(n)?,
            row_scale: try_zeroed(n)?,
            col: try_zeroed(n)?,
        })
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    /// Packed L/U factors of the last successful factorization.
    pub fn factors(&self) -> &[f64] {
        &self.lu
    }

    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Factorize a copy of `a` (`n × n`, row-major). `a` itself is never modified.
    pub fn factorize(&mut self, a: &[f64], n: usize) -> Result<(), LinalgError> {
        if n != self.n {
            return Err(LinalgError::DimensionMismatch {
                op: "lu workspace",
                expected: self.n,
                actual: n,
            });
        }
        check_len("lu (A)", a, n * n)?;

        if let Some(idx) = a.iter().position(|v| !v.is_finite()) {
            return Err(LinalgError::Singular { pivot: idx / n });
        }

        self.lu.copy_from_slice(a);
        for i in 0..n {
            self.perm[i] = i;
            self.row_scale[i] = a[i * n..(i + 1) * n]
                .iter()
                .fold(0.0_f64, |m, v| m.max(v.abs()));
        }

        let lu = &mut self.lu;
        for k in 0..n {
            let mut max_row = k;
            let mut max_val = lu[k * n + k].abs();
            for row in (k + 1)..n {
                let val = lu[row * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = row;
                }
            }

            if max_row != k {
                for c in 0..n {
                    lu.swap(k * n + c, max_row * n + c);
                }
                self.perm.swap(k, max_row);
                self.row_scale.swap(k, max_row);
            }

            let pivot = lu[k * n + k];
            if !pivot.is_finite() || pivot.abs() <= PIVOT_RTOL * self.row_scale[k] {
                return Err(LinalgError::Singular { pivot: k });
            }

            for row in (k + 1)..n {
                let factor = lu[row * n + k] / pivot;
                lu[row * n + k] = factor;
                if factor == 0.0 {
                    continue;
                }
                for c in (k + 1)..n {
                    lu[row * n + c] -= factor * lu[k * n + c];
                }
            }
        }

        Ok(())
    }

    /// Invert `a` into `out`, both `n × n` row-major.
    pub fn invert_into(&mut self, a: &[f64], n: usize, out: &mut [f64]) -> Result<(), LinalgError> {
        check_len("invert (out)", out, n * n)?;
        self.factorize(a, n)?;

        for j in 0..n {
            // Forward substitution on the permuted unit vector e_j.
            for i in 0..n {
                let mut sum = if self.perm[i] == j { 1.0 } else { 0.0 };
                for c in 0..i {
                    sum -= self.lu[i * n + c] * self.col[c];
                }
                self.col[i] = sum;
            }
            for i in (0..n).rev() {
                let mut sum = self.col[i];
                for c in (i + 1)..n {
                    sum -= self.lu[i * n + c] * self.col[c];
                }
                self.col[i] = sum / self.lu[i * n + i];
            }
            for i in 0..n {
                out[i * n + j] = self.col[i];
            }
        }

        if out.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::Singular { pivot: n.saturating_sub(1) });
        }

        Ok(())
    }
}

/// Invert an `n × n` matrix, allocating the result and a one-off workspace.
pub fn invert(a: &[f64], n: usize) -> Result<Vec<f64>, LinalgError> {
    let mut ws = LuWorkspace::try_new(n)?;
    let mut out = try_zeroed(n * n)?;
    ws.invert_into(a, n, &mut out)?;
    Ok(out)
}
