/// Per-spectrum processing
///
/// Each spectrum goes through: intensity/frequency adjustment, arPLS
/// baseline correction, smoothing of the full corrected series, windowing,
/// and peak detection on the windowed filtered series. Every step is a
/// pure function of the spectrum and the shared configuration, so spectra
/// are processed in parallel and the result is cached for the views.

use rayon::prelude::*;

use peak_core::{find_peaks, window_range};
use pls_core::{arpls, BaselineResult, Smoother, SolveError};

use crate::config::ProcessingConfig;
use crate::data::spectrum::*;
use crate::error::RamanError;

/// Fraction of the maximum added below the minimum for the lower y-limit.
pub const Y_LIMIT_FOOT: f64 = 0.05;
/// Fraction of the maximum added above it for the upper y-limit.
pub const Y_LIMIT_HEADROOM: f64 = 0.10;

// =========================================================================
//  Adjustment
// =========================================================================

/// Frequencies and intensities after the optional shift and multiplier.
///
/// The multiplier is applied by magnitude, so a negative value does not
/// flip the spectrum.
pub fn apply_adjustments(spectrum: &Spectrum, config: &ProcessingConfig) -> (Vec<f64>, Vec<f64>) {
    let frequencies = match config.frequency_shift {
        Some(shift) => spectrum.frequencies.iter().map(|f| f + shift).collect(),
        None => spectrum.frequencies.clone(),
    };
    let intensities = match config.intensity_multiplier {
        Some(m) => spectrum.intensities.iter().map(|v| v * m.abs()).collect(),
        None => spectrum.intensities.clone(),
    };
    (frequencies, intensities)
}

// =========================================================================
//  Baseline Correction
// =========================================================================

pub fn baseline_correct(
    name: &str,
    intensities: &[f64],
    config: &ProcessingConfig,
) -> Result<BaselineResult, RamanError> {
    arpls(intensities, &config.arpls_options()).map_err(|source| numerics(name, source))
}

// =========================================================================
//  Smoothing
// =========================================================================

pub fn smooth(name: &str, series: &[f64], config: &ProcessingConfig) -> Result<Vec<f64>, RamanError> {
    let smoother = config.smoother();
    if let Smoother::SavitzkyGolay { window_length, .. } = smoother {
        if window_length > series.len() {
            return Err(RamanError::InvalidConfig(format!(
                "{}: Savitzky-Golay window length {} exceeds the {} samples of the spectrum",
                name,
                window_length,
                series.len()
            )));
        }
    }
    smoother.smooth(series).map_err(|source| numerics(name, source))
}

fn numerics(name: &str, source: SolveError) -> RamanError {
    RamanError::Numerics {
        name: name.to_string(),
        source,
    }
}

// =========================================================================
//  Peak Detection
// =========================================================================

/// Peaks of `intensities` at or above `height`, at least `distance`
/// samples apart, sorted by index.
pub fn detect_peaks(frequencies: &[f64], intensities: &[f64], height: f64, distance: usize) -> Vec<Peak> {
    find_peaks(intensities, height, distance)
        .into_iter()
        .map(|i| Peak::new(i, frequencies[i], intensities[i]))
        .collect()
}

/// Plot limits for a single spectrum: a little below the minimum and some
/// headroom above the maximum.
pub fn y_limits(series: &[f64]) -> Option<(f64, f64)> {
    if series.is_empty() {
        return None;
    }
    let ymax = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let ymin = series.iter().copied().fold(f64::INFINITY, f64::min);
    Some((ymin - ymax * Y_LIMIT_FOOT, ymax + ymax * Y_LIMIT_HEADROOM))
}

// =========================================================================
//  Pipeline
// =========================================================================

/// Run the whole single-spectrum pipeline.
pub fn process_spectrum(spectrum: &Spectrum, config: &ProcessingConfig) -> Result<ProcessedSpectrum, RamanError> {
    let name = spectrum.name.as_str();
    if spectrum.frequencies.len() != spectrum.intensities.len() {
        return Err(numerics(
            name,
            SolveError::DimensionMismatch {
                expected: spectrum.frequencies.len(),
                got: spectrum.intensities.len(),
            },
        ));
    }

    let (frequencies, raw) = apply_adjustments(spectrum, config);

    let baseline = baseline_correct(name, &raw, config)?;
    let corrected: Vec<f64> = baseline
        .corrected
        .iter()
        .map(|v| v + config.intensity_shift)
        .collect();

    let window = window_range(&frequencies, config.xmin, config.xmax);
    let filtered = smooth(name, &corrected, config)?;

    let mut warnings = Vec::new();
    let windowed_frequencies = window.slice(&frequencies).to_vec();
    let windowed_corrected = window.slice(&corrected).to_vec();
    let filtered_intensities = window.slice(&filtered).to_vec();

    let (threshold, peaks, limits) = if window.is_degenerate() {
        warnings.push(PipelineWarning::DegenerateWindow {
            spectrum: name.to_string(),
            start_index: window.start_index,
            end_index: window.end_index,
        });
        (None, Vec::new(), None)
    } else {
        let threshold = config.threshold_policy().resolve(&filtered_intensities);
        let peaks = match threshold {
            Some(height) => detect_peaks(
                &windowed_frequencies,
                &filtered_intensities,
                height,
                config.peak_distance,
            ),
            None => Vec::new(),
        };
        (threshold, peaks, y_limits(&filtered_intensities))
    };

    Ok(ProcessedSpectrum {
        name: name.to_string(),
        full: FullSeries {
            frequencies,
            raw,
            baseline: baseline.baseline,
            corrected,
            filtered,
        },
        window: window.into(),
        windowed_frequencies,
        windowed_corrected,
        filtered_intensities,
        threshold,
        peaks,
        y_limits: limits,
        baseline_iterations: baseline.iterations,
        baseline_termination: baseline.termination.into(),
        warnings,
    })
}

/// Process every spectrum in parallel; results keep the input order.
///
/// The first failure aborts the run.
pub fn process_all(spectra: &[Spectrum], config: &ProcessingConfig) -> Result<Vec<ProcessedSpectrum>, RamanError> {
    spectra
        .par_iter()
        .map(|s| process_spectrum(s, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmoothingMethod;

    fn gaussian(x: f64, center: f64, width: f64, height: f64) -> f64 {
        height * (-((x - center) / width).powi(2)).exp()
    }

    /// Two bands on a sloping background, 200-1200 cm⁻¹.
    fn synthetic(name: &str) -> Spectrum {
        let frequencies: Vec<f64> = (0..501).map(|i| 200.0 + 2.0 * i as f64).collect();
        let intensities = frequencies
            .iter()
            .map(|&f| {
                100.0 + 0.05 * f + gaussian(f, 466.0, 6.0, 500.0) + gaussian(f, 1086.0, 8.0, 300.0)
            })
            .collect();
        Spectrum::new(name, frequencies, intensities)
    }

    #[test]
    fn test_adjustments() {
        let s = Spectrum::new("s", vec![1.0, 2.0], vec![3.0, -4.0]);
        let config = ProcessingConfig {
            intensity_multiplier: Some(-2.0),
            frequency_shift: Some(10.0),
            ..ProcessingConfig::default()
        };
        let (f, i) = apply_adjustments(&s, &config);
        assert_eq!(f, vec![11.0, 12.0]);
        assert_eq!(i, vec![6.0, -8.0]);

        let (f, i) = apply_adjustments(&s, &ProcessingConfig::default());
        assert_eq!(f, s.frequencies);
        assert_eq!(i, s.intensities);
    }

    #[test]
    fn test_finds_both_bands() {
        let p = process_spectrum(&synthetic("quartz"), &ProcessingConfig::default()).unwrap();
        assert!(p.warnings.is_empty());
        assert_eq!(p.windowed_frequencies.len(), 501);
        let labels: Vec<i64> = p.peaks.iter().map(|pk| pk.label).collect();
        assert!(labels.contains(&466), "labels: {:?}", labels);
        assert!(labels.contains(&1086), "labels: {:?}", labels);
        // Background removed: far from the bands the corrected signal is small.
        assert!(p.full.corrected[20].abs() < 5.0);
    }

    #[test]
    fn test_window_restricts_peaks() {
        let config = ProcessingConfig {
            xmin: Some(900.0),
            xmax: Some(1200.0),
            ..ProcessingConfig::default()
        };
        let p = process_spectrum(&synthetic("quartz"), &config).unwrap();
        assert_eq!(p.window.start_index, 350);
        assert_eq!(p.window.end_index, 500);
        assert_eq!(p.windowed_frequencies[0], 900.0);
        assert_eq!(p.filtered_intensities.len(), 151);
        assert!(p.peaks.iter().all(|pk| pk.frequency >= 900.0));
        assert!(p.peaks.iter().any(|pk| pk.label == 1086));
        // Full-length series are kept.
        assert_eq!(p.full.filtered.len(), 501);
    }

    #[test]
    fn test_intensity_shift_added_to_corrected() {
        let base = process_spectrum(&synthetic("a"), &ProcessingConfig::default()).unwrap();
        let config = ProcessingConfig {
            intensity_shift: 50.0,
            ..ProcessingConfig::default()
        };
        let shifted = process_spectrum(&synthetic("a"), &config).unwrap();
        for (a, b) in base.full.corrected.iter().zip(&shifted.full.corrected) {
            assert!((b - a - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_window() {
        let config = ProcessingConfig {
            xmin: Some(500.0 + 0.7),
            xmax: Some(500.0 + 0.7),
            ..ProcessingConfig::default()
        };
        let p = process_spectrum(&synthetic("q"), &config).unwrap();
        assert_eq!(p.window.start_index, p.window.end_index);
        assert!(p.peaks.is_empty());
        assert!(p.filtered_intensities.is_empty());
        assert_eq!(p.y_limits, None);
        assert_eq!(p.threshold, None);
        assert!(matches!(
            p.warnings.as_slice(),
            [PipelineWarning::DegenerateWindow { .. }]
        ));
    }

    #[test]
    fn test_fixed_threshold_sign_ignored() {
        let config = ProcessingConfig {
            threshold: Some(-400.0),
            ..ProcessingConfig::default()
        };
        let p = process_spectrum(&synthetic("q"), &config).unwrap();
        assert_eq!(p.threshold, Some(400.0));
        let labels: Vec<i64> = p.peaks.iter().map(|pk| pk.label).collect();
        assert_eq!(labels, vec![466]);
    }

    #[test]
    fn test_peak_separation() {
        let config = ProcessingConfig {
            peak_distance: 8,
            threshold: Some(0.0),
            ..ProcessingConfig::default()
        };
        let mut s = synthetic("noisy");
        for (i, v) in s.intensities.iter_mut().enumerate() {
            *v += 3.0 * (i as f64 * 2.3).sin();
        }
        let p = process_spectrum(&s, &config).unwrap();
        for pair in p.peaks.windows(2) {
            assert!(pair[1].index - pair[0].index >= 8);
        }
    }

    #[test]
    fn test_idempotent() {
        let config = ProcessingConfig {
            smoothing: SmoothingMethod::SavitzkyGolay {
                window_length: 11,
                poly_order: 3,
            },
            ..ProcessingConfig::default()
        };
        let a = process_spectrum(&synthetic("x"), &config).unwrap();
        let b = process_spectrum(&synthetic("x"), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_savgol_window_too_long() {
        let config = ProcessingConfig {
            smoothing: SmoothingMethod::SavitzkyGolay {
                window_length: 9,
                poly_order: 2,
            },
            ..ProcessingConfig::default()
        };
        let s = Spectrum::new("short", vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![1.0, 3.0, 2.0, 5.0, 1.0]);
        assert!(matches!(
            process_spectrum(&s, &config),
            Err(RamanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_short_spectrum_is_singular() {
        let s = Spectrum::new("tiny", vec![1.0, 2.0], vec![1.0, 2.0]);
        match process_spectrum(&s, &ProcessingConfig::default()) {
            Err(RamanError::Numerics { name, source }) => {
                assert_eq!(name, "tiny");
                assert!(source.is_singular());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_process_all_keeps_order() {
        let spectra: Vec<Spectrum> = ["c", "a", "b"].iter().map(|n| synthetic(n)).collect();
        let out = process_all(&spectra, &ProcessingConfig::default()).unwrap();
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_y_limits() {
        let (lo, hi) = y_limits(&[-1.0, 4.0, 10.0]).unwrap();
        assert!((lo - (-1.5)).abs() < 1e-12);
        assert!((hi - 11.0).abs() < 1e-12);
        assert_eq!(y_limits(&[]), None);
    }
}
