//! Errors raised by the penalized least-squares kernels.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Singular system: {len} samples, at least {min} required for a second-difference penalty")]
    TooShort { len: usize, min: usize },
    #[error("Singular system: non-positive pivot {pivot} at row {row}")]
    ZeroPivot { row: usize, pivot: f64 },
    #[error("Dimension mismatch: expected {expected} values, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SolveError {
    /// True for failures of the linear system itself, as opposed to bad arguments.
    pub fn is_singular(&self) -> bool {
        matches!(self, SolveError::TooShort { .. } | SolveError::ZeroPivot { .. })
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SolveError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
