use crate::linalg::LinalgError;

/// Failure of a single Gauss-Newton fit call.
///
/// Running out of iterations is not an error; see [`crate::fit::FitSummary::converged`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("x and y sequences differ in length ({x_len} vs {y_len})")]
    DimensionMismatch { x_len: usize, y_len: usize },

    #[error("could not allocate fit workspace: {0}")]
    Allocation(#[source] LinalgError),

    #[error("invalid solver settings: {0}")]
    InvalidSettings(String),

    #[error("invalid value {value} for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("normal matrix could not be inverted at iteration {iteration}: {source}")]
    SingularMatrix {
        iteration: usize,
        #[source]
        source: LinalgError,
    },

    #[error("linear algebra failure at iteration {iteration}: {source}")]
    Kernel {
        iteration: usize,
        #[source]
        source: LinalgError,
    },

    #[error("parameter step is not finite at iteration {iteration}")]
    NonFiniteStep { iteration: usize },
}

impl FitError {
    pub(crate) fn from_kernel(iteration: usize, source: LinalgError) -> Self {
        match source {
            LinalgError::Allocation { .. } => Self::Allocation(source),
            LinalgError::Singular { .. } => Self::SingularMatrix { iteration, source },
            LinalgError::DimensionMismatch { .. } => Self::Kernel { iteration, source },
        }
    }

    /// Iteration at which the fit failed, for failures raised inside the loop.
    pub fn iteration(&self) -> Option<usize> {
        match self {
            FitError::SingularMatrix { iteration, .. }
            | FitError::Kernel { iteration, .. }
            | FitError::NonFiniteStep { iteration } => Some(*iteration),
            _ => None,
        }
    }

    /// Exit code used by the `nlls` binary for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::DimensionMismatch { .. } => 2,
            FitError::InvalidSettings(_) | FitError::InvalidParameter { .. } => 3,
            _ => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), format!("Curve fit failed: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
