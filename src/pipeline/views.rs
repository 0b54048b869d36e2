/// Multi-spectrum views
///
/// Overlay and stacked presentations built from already processed
/// spectra. Peaks of a view are found on the concatenation of its
/// contributors' windowed filtered series, so `Peak::index` refers to a
/// position in that concatenation.

use peak_core::{stacked_offset, stacked_threshold, NORMALIZED_HEIGHT};

use super::processing::{detect_peaks, y_limits};
use crate::config::ProcessingConfig;
use crate::data::spectrum::*;

/// All views for `spectra`, or none when overlays are not requested.
pub fn build_views(spectra: &[ProcessedSpectrum], config: &ProcessingConfig) -> Vec<CompositeView> {
    if !config.overlay {
        return Vec::new();
    }
    vec![
        overlay_raw(spectra, config),
        overlay_normalized(spectra, config),
        stacked_normalized(spectra, config),
    ]
}

/// Spectra with a non-empty window; the rest are reported in `warnings`.
fn windowed<'a>(
    spectra: &'a [ProcessedSpectrum],
    warnings: &mut Vec<PipelineWarning>,
) -> Vec<&'a ProcessedSpectrum> {
    let mut out = Vec::with_capacity(spectra.len());
    for s in spectra {
        if s.has_window() {
            out.push(s);
        } else {
            warnings.push(PipelineWarning::DegenerateWindow {
                spectrum: s.name.clone(),
                start_index: s.window.start_index,
                end_index: s.window.end_index,
            });
        }
    }
    out
}

/// Windowed filtered series divided by their own maximum. Series whose
/// maximum is not positive are left out with a warning.
fn normalized(spectra: &[ProcessedSpectrum], warnings: &mut Vec<PipelineWarning>) -> Vec<ViewSeries> {
    let mut out = Vec::new();
    for s in windowed(spectra, warnings) {
        let maximum = s
            .filtered_intensities
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if !(maximum > 0.0) || !maximum.is_finite() {
            warnings.push(PipelineWarning::NotNormalizable {
                spectrum: s.name.clone(),
                maximum,
            });
            continue;
        }
        out.push(ViewSeries {
            name: s.name.clone(),
            frequencies: s.windowed_frequencies.clone(),
            intensities: s.filtered_intensities.iter().map(|v| v / maximum).collect(),
            offset: 0.0,
        });
    }
    out
}

fn concatenate(series: &[ViewSeries]) -> (Vec<f64>, Vec<f64>) {
    let mut frequencies = Vec::new();
    let mut intensities = Vec::new();
    for s in series {
        frequencies.extend_from_slice(&s.frequencies);
        intensities.extend_from_slice(&s.intensities);
    }
    (frequencies, intensities)
}

/// Windowed filtered series as they are.
pub fn overlay_raw(spectra: &[ProcessedSpectrum], config: &ProcessingConfig) -> CompositeView {
    let mut warnings = Vec::new();
    let series: Vec<ViewSeries> = windowed(spectra, &mut warnings)
        .into_iter()
        .map(|s| ViewSeries {
            name: s.name.clone(),
            frequencies: s.windowed_frequencies.clone(),
            intensities: s.filtered_intensities.clone(),
            offset: 0.0,
        })
        .collect();

    let (frequencies, intensities) = concatenate(&series);
    let peaks = match config.threshold_policy().resolve(&intensities) {
        Some(height) if !intensities.is_empty() => {
            detect_peaks(&frequencies, &intensities, height, config.peak_distance)
        }
        _ => Vec::new(),
    };

    CompositeView {
        kind: ViewKind::OverlayRaw,
        series,
        peaks,
        y_limits: y_limits(&intensities),
        warnings,
    }
}

/// Each series scaled to a maximum of 1.
pub fn overlay_normalized(spectra: &[ProcessedSpectrum], config: &ProcessingConfig) -> CompositeView {
    let mut warnings = Vec::new();
    let series = normalized(spectra, &mut warnings);
    let (frequencies, intensities) = concatenate(&series);
    let peaks = detect_peaks(&frequencies, &intensities, NORMALIZED_HEIGHT, config.peak_distance);

    CompositeView {
        kind: ViewKind::OverlayNormalized,
        series,
        peaks,
        y_limits: y_limits(&intensities),
        warnings,
    }
}

/// Normalized series lifted onto separate tiers.
///
/// Tier `k` is offset by `k + 0.3k`. Its peaks are searched on tiers
/// `0..=k` with the tier's own threshold and only those inside tier `k`
/// are kept.
pub fn stacked_normalized(spectra: &[ProcessedSpectrum], config: &ProcessingConfig) -> CompositeView {
    let mut warnings = Vec::new();
    let mut series = normalized(spectra, &mut warnings);
    for (tier, s) in series.iter_mut().enumerate() {
        let offset = stacked_offset(tier);
        s.offset = offset;
        for v in s.intensities.iter_mut() {
            *v += offset;
        }
    }

    let (frequencies, intensities) = concatenate(&series);
    let mut peaks = Vec::new();
    let mut segment_start = 0;
    for (tier, s) in series.iter().enumerate() {
        let segment_end = segment_start + s.intensities.len();
        let found = detect_peaks(
            &frequencies[..segment_end],
            &intensities[..segment_end],
            stacked_threshold(tier),
            config.peak_distance,
        );
        peaks.extend(
            found
                .into_iter()
                .filter(|p| p.index >= segment_start && p.index < segment_end),
        );
        segment_start = segment_end;
    }

    CompositeView {
        kind: ViewKind::StackedNormalized,
        series,
        peaks,
        y_limits: y_limits(&intensities),
        warnings,
    }
}
