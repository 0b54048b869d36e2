//! Asymmetrically reweighted penalized least squares (arPLS) baseline.
//!
//! Each pass solves `(W + λ·DᵀD)·z = W·y` and recomputes the weights from
//! the negative residuals `d = y - z`: samples well above the fitted curve
//! (peaks) get weights near 0, samples on or below it keep weights near 1.

use crate::banded::SecondDifferencePenalty;
use crate::error::SolveError;

pub const DEFAULT_LAMBDA: f64 = 1000.0;
pub const DEFAULT_RATIO: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArplsOptions {
    /// Smoothness of the baseline.
    pub lambda: f64,
    /// Stop once `‖w' - w‖ / ‖w‖` falls to or below this.
    pub ratio: f64,
    /// Upper bound on the number of linear solves.
    pub max_iterations: usize,
}

impl Default for ArplsOptions {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            ratio: DEFAULT_RATIO,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Why the reweighting loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged,
    /// No negative residuals, or their spread vanished.
    DegenerateWeights,
    IterationCap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaselineResult {
    pub baseline: Vec<f64>,
    /// `y - baseline`
    pub corrected: Vec<f64>,
    /// Number of linear solves performed.
    pub iterations: usize,
    pub termination: Termination,
}

struct ReweightState {
    weights: Vec<f64>,
    iteration: usize,
}

/// Estimate the baseline of `y`.
///
/// Always performs at least one solve; the curve from the last solve is
/// returned whichever way the loop ends.
pub fn arpls(y: &[f64], options: &ArplsOptions) -> Result<BaselineResult, SolveError> {
    if !options.ratio.is_finite() || options.ratio < 0.0 {
        return Err(SolveError::invalid(
            "ratio",
            format!("must be finite and non-negative, got {}", options.ratio),
        ));
    }
    let penalty = SecondDifferencePenalty::new(y.len(), options.lambda)?;
    let max_iterations = options.max_iterations.max(1);

    let mut state = ReweightState {
        weights: vec![1.0; y.len()],
        iteration: 0,
    };

    loop {
        let rhs: Vec<f64> = state.weights.iter().zip(y).map(|(w, v)| w * v).collect();
        let z = penalty.solve(&state.weights, &rhs)?;
        state.iteration += 1;

        let termination = match reweight(y, &z) {
            None => Some(Termination::DegenerateWeights),
            Some(next) => {
                let crit = relative_change(&state.weights, &next);
                state.weights = next;
                if !crit.is_finite() {
                    Some(Termination::DegenerateWeights)
                } else if crit <= options.ratio {
                    Some(Termination::Converged)
                } else if state.iteration >= max_iterations {
                    Some(Termination::IterationCap)
                } else {
                    None
                }
            }
        };

        if let Some(termination) = termination {
            let corrected = y.iter().zip(&z).map(|(v, b)| v - b).collect();
            return Ok(BaselineResult {
                baseline: z,
                corrected,
                iterations: state.iteration,
                termination,
            });
        }
    }
}

/// New weights from the residual `y - z`, or `None` when the negative
/// residuals give no usable statistics.
fn reweight(y: &[f64], z: &[f64]) -> Option<Vec<f64>> {
    let d: Vec<f64> = y.iter().zip(z).map(|(v, b)| v - b).collect();
    let negatives: Vec<f64> = d.iter().copied().filter(|v| *v < 0.0).collect();
    if negatives.is_empty() {
        return None;
    }

    let count = negatives.len() as f64;
    let mean = negatives.iter().sum::<f64>() / count;
    let variance = negatives.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let std = variance.sqrt();
    if !(std > 0.0) || !std.is_finite() {
        return None;
    }

    let shift = 2.0 * std - mean;
    Some(
        d.iter()
            .map(|di| logistic(-2.0 * (di - shift) / std))
            .collect(),
    )
}

/// `1 / (1 + e^-x)` without overflow for large `|x|`.
fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn relative_change(old: &[f64], new: &[f64]) -> f64 {
    let diff: f64 = old
        .iter()
        .zip(new)
        .map(|(a, b)| (b - a).powi(2))
        .sum::<f64>()
        .sqrt();
    let norm: f64 = old.iter().map(|a| a * a).sum::<f64>().sqrt();
    diff / norm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian(x: f64, center: f64, width: f64, height: f64) -> f64 {
        height * (-((x - center) / width).powi(2)).exp()
    }

    #[test]
    fn test_logistic_is_stable() {
        assert!((logistic(0.0) - 0.5).abs() < 1e-15);
        assert_eq!(logistic(-1000.0), 0.0);
        assert_eq!(logistic(1000.0), 1.0);
        assert!((logistic(2.0) + logistic(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_sloped_baseline_under_peak() {
        let n = 300;
        let y: Vec<f64> = (0..n)
            .map(|i| {
                let x = i as f64;
                5.0 + 0.02 * x + gaussian(x, 150.0, 6.0, 40.0) + 0.05 * (x * 1.7).sin()
            })
            .collect();

        let res = arpls(&y, &ArplsOptions::default()).unwrap();
        assert_eq!(res.baseline.len(), n);
        assert!(res.iterations >= 1 && res.iterations <= DEFAULT_MAX_ITERATIONS);

        // Away from the peak the baseline follows the slope.
        for &i in &[10usize, 60, 250, 290] {
            let expected = 5.0 + 0.02 * i as f64;
            assert!(
                (res.baseline[i] - expected).abs() < 0.5,
                "baseline[{}] = {}",
                i,
                res.baseline[i]
            );
        }
        // The peak survives the correction.
        assert!(res.corrected[150] > 35.0);
        for i in 0..n {
            assert!((res.corrected[i] - (y[i] - res.baseline[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_iteration_cap() {
        let y: Vec<f64> = (0..100)
            .map(|i| gaussian(i as f64, 50.0, 4.0, 10.0) + (i as f64 * 0.9).sin())
            .collect();
        let options = ArplsOptions {
            ratio: 0.0,
            max_iterations: 3,
            ..ArplsOptions::default()
        };
        let res = arpls(&y, &options).unwrap();
        assert!(res.iterations <= 3);
        if res.termination == Termination::IterationCap {
            assert_eq!(res.iterations, 3);
        }
    }

    #[test]
    fn test_flat_zero_signal_is_degenerate() {
        // The first fit is exact, leaving no negative residual to reweight from.
        let y = vec![0.0; 50];
        let res = arpls(&y, &ArplsOptions::default()).unwrap();
        assert_eq!(res.iterations, 1);
        assert_eq!(res.termination, Termination::DegenerateWeights);
        assert!(res.baseline.iter().all(|b| *b == 0.0));
    }

    #[test]
    fn test_flat_signal_baseline_is_the_constant() {
        for &c in &[5.0, 1000.0, -3.25, 12345.678] {
            for &n in &[3usize, 7, 50, 500] {
                let y = vec![c; n];
                let res = arpls(&y, &ArplsOptions::default()).unwrap();
                let tol = 1e-6 * f64::max(1.0, c.abs());
                for i in 0..n {
                    assert!(
                        (res.baseline[i] - c).abs() < tol,
                        "c={} n={} baseline[{}] = {}",
                        c,
                        n,
                        i,
                        res.baseline[i]
                    );
                    assert!(res.corrected[i].abs() < tol);
                }
            }
        }
    }

    #[test]
    fn test_single_spike_is_kept_out_of_baseline() {
        let y = [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0];
        let options = ArplsOptions {
            lambda: 1000.0,
            ..ArplsOptions::default()
        };
        let res = arpls(&y, &options).unwrap();
        for b in &res.baseline {
            assert!(b.abs() < 1e-6, "baseline = {:?}", res.baseline);
        }
        assert!((res.corrected[3] - 10.0).abs() < 1e-6);
        for i in [0, 1, 2, 4, 5, 6] {
            assert!(res.corrected[i].abs() < 1e-6);
        }
    }

    #[test]
    fn test_too_short() {
        let err = arpls(&[1.0, 2.0], &ArplsOptions::default()).unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn test_deterministic() {
        let y: Vec<f64> = (0..120)
            .map(|i| gaussian(i as f64, 30.0, 3.0, 7.0) + 0.01 * i as f64)
            .collect();
        let a = arpls(&y, &ArplsOptions::default()).unwrap();
        let b = arpls(&y, &ArplsOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
