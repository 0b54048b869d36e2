//! Windowing and peak detection for sampled spectra.
//!
//! Nearest-sample frequency windows, local-maximum peak finding with a
//! height cutoff and minimum spacing, and the threshold rules used for
//! single spectra, overlays and stacked views.

pub mod peaks;
pub mod threshold;
pub mod window;

pub use peaks::*;
pub use threshold::*;
pub use window::*;
