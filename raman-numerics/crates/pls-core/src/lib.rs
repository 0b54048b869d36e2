//! Penalized least squares for one-dimensional spectra.
//!
//! This crate holds the numeric kernels used by the Raman pipeline: a
//! pentadiagonal Cholesky solver for `(W + λ·DᵀD)·z = W·y`, the arPLS
//! asymmetric baseline estimator built on it, and the two smoothing
//! filters (Whittaker and Savitzky-Golay).

pub mod arpls;
pub mod banded;
pub mod error;
pub mod savgol;
pub mod smoother;
pub mod whittaker;

pub use arpls::*;
pub use banded::*;
pub use error::*;
pub use savgol::*;
pub use smoother::*;
pub use whittaker::*;
