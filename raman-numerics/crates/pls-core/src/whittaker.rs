//! Whittaker smoother: one penalized least-squares solve with unit weights.

use crate::banded::SecondDifferencePenalty;
use crate::error::SolveError;

pub const DEFAULT_WHITTAKER_LAMBDA: f64 = 1.0;

/// Solve `(I + λ·DᵀD)·z = y`.
///
/// Straight lines (constants included) lie in the null space of the
/// penalty and come back unchanged up to rounding.
pub fn whittaker(y: &[f64], lambda: f64) -> Result<Vec<f64>, SolveError> {
    let penalty = SecondDifferencePenalty::new(y.len(), lambda)?;
    let weights = vec![1.0; y.len()];
    penalty.solve(&weights, y)
}
