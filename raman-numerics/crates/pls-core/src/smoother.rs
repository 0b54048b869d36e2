//! Choice of smoothing filter.

use crate::error::SolveError;
use crate::savgol::savitzky_golay;
use crate::whittaker::{whittaker, DEFAULT_WHITTAKER_LAMBDA};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoother {
    Whittaker { lambda: f64 },
    SavitzkyGolay { window_length: usize, poly_order: usize },
}

impl Default for Smoother {
    fn default() -> Self {
        Smoother::Whittaker {
            lambda: DEFAULT_WHITTAKER_LAMBDA,
        }
    }
}

impl Smoother {
    /// Filter `y`; the output has the same length.
    pub fn smooth(&self, y: &[f64]) -> Result<Vec<f64>, SolveError> {
        match *self {
            Smoother::Whittaker { lambda } => whittaker(y, lambda),
            Smoother::SavitzkyGolay {
                window_length,
                poly_order,
            } => savitzky_golay(y, window_length, poly_order),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Smoother::Whittaker { .. } => "Whittaker",
            Smoother::SavitzkyGolay { .. } => "Savitzky-Golay",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_whittaker() {
        assert_eq!(Smoother::default(), Smoother::Whittaker { lambda: 1.0 });
        assert_eq!(Smoother::default().name(), "Whittaker");
    }

    #[test]
    fn test_dispatch() {
        let y: Vec<f64> = (0..15).map(|i| (i as f64 * 0.4).cos()).collect();
        let sg = Smoother::SavitzkyGolay {
            window_length: 5,
            poly_order: 2,
        };
        assert_eq!(sg.smooth(&y).unwrap(), savitzky_golay(&y, 5, 2).unwrap());
        let wh = Smoother::Whittaker { lambda: 3.0 };
        assert_eq!(wh.smooth(&y).unwrap(), whittaker(&y, 3.0).unwrap());
    }
}
