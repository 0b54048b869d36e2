//! Second-difference penalty and its pentadiagonal Cholesky solver.
//!
//! `λ·DᵀD`, with `D` the `(L-2)×L` second-order difference operator, is a
//! symmetric matrix of bandwidth 2. Only the lower band is stored. Adding a
//! non-negative diagonal weight vector keeps the bandwidth, so each solve
//! of `(W + λ·DᵀD)·z = b` is an O(L) factorization plus two substitutions.

use crate::error::SolveError;

/// Smallest series the difference penalty is defined on.
pub const MIN_POINTS: usize = 3;

/// Stencil of one row of the second-order difference operator.
const STENCIL: [f64; 3] = [1.0, -2.0, 1.0];

/// Lower band of `λ·DᵀD` for a series of fixed length.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondDifferencePenalty {
    lambda: f64,
    /// `M[i][i]`
    diag: Vec<f64>,
    /// `M[i+1][i]`
    sub1: Vec<f64>,
    /// `M[i+2][i]`
    sub2: Vec<f64>,
}

impl SecondDifferencePenalty {
    /// Assemble the penalty for `len` samples with smoothness weight `lambda`.
    pub fn new(len: usize, lambda: f64) -> Result<Self, SolveError> {
        if len < MIN_POINTS {
            return Err(SolveError::TooShort {
                len,
                min: MIN_POINTS,
            });
        }
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(SolveError::invalid(
                "lambda",
                format!("must be finite and non-negative, got {}", lambda),
            ));
        }

        let mut diag = vec![0.0; len];
        let mut sub1 = vec![0.0; len - 1];
        let mut sub2 = vec![0.0; len - 2];

        // Each difference row touches samples k..k+2 and contributes the
        // outer product of the stencil with itself.
        for k in 0..len - 2 {
            for a in 0..3 {
                for b in 0..=a {
                    let v = lambda * STENCIL[a] * STENCIL[b];
                    match a - b {
                        0 => diag[k + a] += v,
                        1 => sub1[k + b] += v,
                        _ => sub2[k + b] += v,
                    }
                }
            }
        }

        Ok(Self {
            lambda,
            diag,
            sub1,
            sub2,
        })
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Solve `(diag(weights) + λ·DᵀD)·z = rhs`.
    pub fn solve(&self, weights: &[f64], rhs: &[f64]) -> Result<Vec<f64>, SolveError> {
        let n = self.len();
        check_len(n, weights.len())?;
        check_len(n, rhs.len())?;

        let factor = self.factor(weights)?;

        // L·u = rhs
        let mut u = vec![0.0; n];
        for i in 0..n {
            let mut s = rhs[i];
            if i >= 1 {
                s -= factor[i][1] * u[i - 1];
            }
            if i >= 2 {
                s -= factor[i][0] * u[i - 2];
            }
            u[i] = s / factor[i][2];
        }

        // Lᵀ·z = u
        let mut z = vec![0.0; n];
        for i in (0..n).rev() {
            let mut s = u[i];
            if i + 1 < n {
                s -= factor[i + 1][1] * z[i + 1];
            }
            if i + 2 < n {
                s -= factor[i + 2][0] * z[i + 2];
            }
            z[i] = s / factor[i][2];
        }

        Ok(z)
    }

    /// Matrix-vector product `(diag(weights) + λ·DᵀD)·x`.
    pub fn apply(&self, weights: &[f64], x: &[f64]) -> Result<Vec<f64>, SolveError> {
        let n = self.len();
        check_len(n, weights.len())?;
        check_len(n, x.len())?;

        let mut out: Vec<f64> = (0..n)
            .map(|i| (weights[i] + self.diag[i]) * x[i])
            .collect();
        for i in 0..n - 1 {
            out[i + 1] += self.sub1[i] * x[i];
            out[i] += self.sub1[i] * x[i + 1];
        }
        for i in 0..n - 2 {
            out[i + 2] += self.sub2[i] * x[i];
            out[i] += self.sub2[i] * x[i + 2];
        }
        Ok(out)
    }

    /// Banded Cholesky factor; row `i` holds `[L[i][i-2], L[i][i-1], L[i][i]]`.
    fn factor(&self, weights: &[f64]) -> Result<Vec<[f64; 3]>, SolveError> {
        let n = self.len();
        let mut l = vec![[0.0f64; 3]; n];

        for i in 0..n {
            if i >= 2 {
                l[i][0] = self.sub2[i - 2] / l[i - 2][2];
            }
            if i >= 1 {
                let mut s = self.sub1[i - 1];
                if i >= 2 {
                    s -= l[i][0] * l[i - 1][1];
                }
                l[i][1] = s / l[i - 1][2];
            }
            let pivot = weights[i] + self.diag[i] - l[i][0] * l[i][0] - l[i][1] * l[i][1];
            if !(pivot > 0.0) || !pivot.is_finite() {
                return Err(SolveError::ZeroPivot { row: i, pivot });
            }
            l[i][2] = pivot.sqrt();
        }

        Ok(l)
    }
}

fn check_len(expected: usize, got: usize) -> Result<(), SolveError> {
    if expected != got {
        return Err(SolveError::DimensionMismatch { expected, got });
    }
    Ok(())
}
