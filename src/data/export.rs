/// Output files: windowed CSV per spectrum, the JSON report consumed by
/// external plotting, and the plain-text peak summary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::spectrum::{CompositeView, ProcessedSpectrum};
use crate::config::ProcessingConfig;
use crate::error::RamanError;

pub const CSV_DELIMITER: &str = ",";
pub const REPORT_FILE_NAME: &str = "report.json";

/// `<name>-mod.csv`
pub fn csv_file_name(name: &str) -> String {
    format!("{}-mod.csv", name)
}

/// Windowed `(frequency, filtered intensity)` rows, `%.3f` / `%.2f`.
pub fn format_corrected_csv(spectrum: &ProcessedSpectrum) -> String {
    let mut out = String::new();
    for (f, v) in spectrum
        .windowed_frequencies
        .iter()
        .zip(&spectrum.filtered_intensities)
    {
        out.push_str(&format!("{:.3}{}{:.2}\n", f, CSV_DELIMITER, v));
    }
    out
}

pub fn write_corrected_csv(dir: &Path, spectrum: &ProcessedSpectrum) -> Result<PathBuf, RamanError> {
    let path = dir.join(csv_file_name(&spectrum.name));
    write_file(&path, &format_corrected_csv(spectrum))?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

/// Everything an external renderer needs to draw the figures of a run
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub generated: DateTime<Local>,
    pub software_version: String,
    pub config: &'a ProcessingConfig,
    pub spectra: &'a [ProcessedSpectrum],
    pub views: &'a [CompositeView],
}

impl<'a> Report<'a> {
    pub fn new(
        config: &'a ProcessingConfig,
        spectra: &'a [ProcessedSpectrum],
        views: &'a [CompositeView],
    ) -> Self {
        Self {
            generated: Local::now(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            spectra,
            views,
        }
    }

    pub fn to_json(&self) -> Result<String, RamanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_report(dir: &Path, report: &Report<'_>) -> Result<PathBuf, RamanError> {
    let path = dir.join(REPORT_FILE_NAME);
    write_file(&path, &report.to_json()?)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

/// Human-readable peak listing for every spectrum and view.
pub fn peak_summary(spectra: &[ProcessedSpectrum], views: &[CompositeView]) -> String {
    let mut out = String::new();
    for s in spectra {
        out.push_str(&format!("# Spectrum: {}\n", s.name));
        out.push_str(&format!("# Data points: {}\n", s.full.frequencies.len()));
        out.push_str(&format!(
            "# Baseline: {} iterations, {}\n",
            s.baseline_iterations, s.baseline_termination
        ));
        if !s.has_window() {
            out.push_str("# Window: empty\n\n");
            continue;
        }
        out.push_str(&format!(
            "# Window: {:.2} - {:.2} cm-1 ({} points)\n",
            s.windowed_frequencies[0],
            s.windowed_frequencies[s.windowed_frequencies.len() - 1],
            s.windowed_frequencies.len()
        ));
        if let Some(t) = s.threshold {
            out.push_str(&format!("# Threshold: {:.2}\n", t));
        }
        push_peak_table(&mut out, &s.peaks);
    }
    for v in views {
        out.push_str(&format!("# View: {} ({} spectra)\n", v.kind, v.series.len()));
        push_peak_table(&mut out, &v.peaks);
    }
    out
}

fn push_peak_table(out: &mut String, peaks: &[super::spectrum::Peak]) {
    out.push_str(&format!("# Peak List ({} peaks)\n", peaks.len()));
    if !peaks.is_empty() {
        out.push_str("Peak_No\tRaman_Shift_cm-1\tIntensity\tLabel\n");
        for (i, p) in peaks.iter().enumerate() {
            out.push_str(&format!(
                "{}\t{:.3}\t{:.2}\t{}\n",
                i + 1,
                p.frequency,
                p.intensity,
                p.label
            ));
        }
    }
    out.push('\n');
}

fn write_file(path: &Path, content: &str) -> Result<(), RamanError> {
    std::fs::write(path, content).map_err(|source| RamanError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::spectrum::*;

    fn processed() -> ProcessedSpectrum {
        ProcessedSpectrum {
            name: "calcite".into(),
            full: FullSeries {
                frequencies: vec![1.0, 2.0, 3.0],
                raw: vec![1.0, 5.0, 1.0],
                baseline: vec![0.0; 3],
                corrected: vec![1.0, 5.0, 1.0],
                filtered: vec![1.0, 4.0, 1.0],
            },
            window: WindowBounds {
                start_index: 0,
                end_index: 2,
            },
            windowed_frequencies: vec![1.0, 2.0, 3.0],
            windowed_corrected: vec![1.0, 5.0, 1.0],
            filtered_intensities: vec![1.0, 4.004, 1.0],
            threshold: Some(0.25),
            peaks: vec![Peak::new(1, 2.0, 4.004)],
            y_limits: Some((0.8, 4.4)),
            baseline_iterations: 4,
            baseline_termination: BaselineTermination::Converged,
            warnings: vec![],
        }
    }

    #[test]
    fn test_csv_format() {
        let csv = format_corrected_csv(&processed());
        assert_eq!(csv, "1.000,1.00\n2.000,4.00\n3.000,1.00\n");
        assert_eq!(csv_file_name("calcite"), "calcite-mod.csv");
    }

    #[test]
    fn test_report_json() {
        let config = ProcessingConfig::default();
        let spectra = vec![processed()];
        let report = Report::new(&config, &spectra, &[]);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["spectra"][0]["name"], "calcite");
        assert_eq!(value["spectra"][0]["peaks"][0]["label"], 2);
        assert_eq!(value["config"]["baseline_lambda"], 1000.0);
        assert!(value["views"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_write_outputs() {
        let dir = std::env::temp_dir().join(format!("raman-export-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let p = processed();
        let path = write_corrected_csv(&dir, &p).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format_corrected_csv(&p));

        let config = ProcessingConfig::default();
        let spectra = vec![p];
        let path = write_report(&dir, &Report::new(&config, &spectra, &[])).unwrap();
        assert!(path.ends_with(REPORT_FILE_NAME));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = Path::new("/nonexistent/raman/out");
        let err = write_corrected_csv(dir, &processed()).unwrap_err();
        assert!(matches!(err, RamanError::Write { .. }));
    }

    #[test]
    fn test_peak_summary() {
        let text = peak_summary(&[processed()], &[]);
        assert!(text.contains("# Spectrum: calcite"));
        assert!(text.contains("# Peak List (1 peaks)"));
        assert!(text.contains("2.000\t4.00\t2"));
    }
}
