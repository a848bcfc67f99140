//! Small dense linear algebra kernel.
//!
//! Every routine works on flat row-major `f64` buffers. Dimensions are always
//! passed by the caller; nothing is inferred from a buffer or stored alongside
//! it. The fit problems we solve have 2–4 parameters, so the kernel stays a
//! plain triple loop plus an LU factorization with partial pivoting.

pub mod lu;
pub mod matrix;

pub use lu::*;
pub use matrix::*;

/// Errors reported by the kernel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinalgError {
    #[error("could not allocate a working buffer of {len} elements")]
    Allocation { len: usize },

    #[error("{op}: dimension mismatch (expected {expected}, got {actual})")]
    DimensionMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("matrix is singular or numerically degenerate (pivot {pivot})")]
    Singular { pivot: usize },
}

/// Allocate a zeroed buffer, reporting failure instead of aborting.
pub fn try_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>, LinalgError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| LinalgError::Allocation { len })?;
    buf.resize(len, T::default());
    Ok(buf)
}

pub(crate) fn check_len(op: &'static str, buf: &[f64], expected: usize) -> Result<(), LinalgError> {
    if buf.len() != expected {
        return Err(LinalgError::DimensionMismatch {
            op,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}
