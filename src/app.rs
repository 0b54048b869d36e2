/// Run orchestration
///
/// `RamanApp` owns the validated configuration, the output options and
/// the reproducibility log. A run loads every file, processes the spectra,
/// builds the composite views, writes the requested outputs and finally
/// the log itself.

use std::path::{Path, PathBuf};

use crate::config::{OutputSelection, ProcessingConfig};
use crate::data::export::{self, Report};
use crate::data::loader;
use crate::data::spectrum::{CompositeView, ProcessedSpectrum};
use crate::error::RamanError;
use crate::log::reproducibility::ReproLog;
use crate::pipeline::{processing, views};

/// Format of the reproducibility log written after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
    Script,
}

impl LogFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            LogFormat::Text => "raman-tl-log.txt",
            LogFormat::Json => "raman-tl-log.json",
            LogFormat::Script => "raman-tl-rerun.sh",
        }
    }
}

/// Where and what to write
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub dir: PathBuf,
    pub selection: OutputSelection,
    pub show_summary: bool,
    pub log_format: Option<LogFormat>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            selection: OutputSelection::default(),
            show_summary: false,
            log_format: None,
        }
    }
}

/// Results of a run
#[derive(Debug)]
pub struct RunOutcome {
    pub spectra: Vec<ProcessedSpectrum>,
    pub views: Vec<CompositeView>,
    /// Files written, log excluded
    pub written: Vec<PathBuf>,
    pub log_path: Option<PathBuf>,
}

pub struct RamanApp {
    config: ProcessingConfig,
    outputs: OutputOptions,
    log: ReproLog,
}

impl RamanApp {
    pub fn new(config: ProcessingConfig, outputs: OutputOptions) -> Result<Self, RamanError> {
        config.validate()?;
        Ok(Self {
            config,
            outputs,
            log: ReproLog::new(),
        })
    }

    pub fn log_mut(&mut self) -> &mut ReproLog {
        &mut self.log
    }

    pub fn run(&mut self, files: &[PathBuf]) -> Result<RunOutcome, RamanError> {
        if let Some(shift) = self.config.frequency_shift {
            log::warn!(
                "Shifting all frequencies by {} cm-1; this changes the scientific meaning of the data",
                shift
            );
        }
        if self.outputs.selection.png {
            log::warn!("PNG output is not produced by raman-tl; use report.json (-s j) to render figures");
        }

        let spectra = loader::load_all(files)?;
        for s in &spectra {
            self.log.add_source(&s.source_path.display().to_string());
            self.log.add_entry(
                "Load",
                &format!("{} ({} points)", s.name, s.len()),
                &format!("file={}", s.source_path.display()),
            );
        }

        let processed = processing::process_all(&spectra, &self.config)?;
        for p in &processed {
            self.record_spectrum(p);
        }

        let views = views::build_views(&processed, &self.config);
        for v in &views {
            for w in &v.warnings {
                log::warn!("{}: {}", v.kind, w);
            }
            self.log.add_entry(
                "Composite View",
                &format!("{}: {} spectra, {} peaks", v.kind, v.series.len(), v.peaks.len()),
                "",
            );
        }

        let written = self.write_outputs(&processed, &views)?;

        if self.outputs.show_summary {
            print!("{}", export::peak_summary(&processed, &views));
        }

        let log_path = self.write_log()?;

        Ok(RunOutcome {
            spectra: processed,
            views,
            written,
            log_path,
        })
    }

    fn record_spectrum(&mut self, p: &ProcessedSpectrum) {
        let arpls = self.config.arpls_options();
        self.log.add_entry(
            "Baseline Correction",
            &format!(
                "{}: arPLS, {} iterations, {}",
                p.name, p.baseline_iterations, p.baseline_termination
            ),
            &format!(
                "lambda={} ratio={} max_iterations={}",
                arpls.lambda, arpls.ratio, arpls.max_iterations
            ),
        );
        self.log.add_entry(
            "Smoothing",
            &format!("{}: {}", p.name, self.config.smoothing.describe()),
            &format!("intensity_shift={}", self.config.intensity_shift),
        );
        for w in &p.warnings {
            log::warn!("{}", w);
        }
        let threshold = match (p.threshold, self.config.threshold) {
            (Some(t), Some(_)) => format!("threshold={} (fixed)", t),
            (Some(t), None) => format!("threshold={} (auto)", t),
            (None, _) => "threshold=none".to_string(),
        };
        self.log.add_entry(
            "Peak Detection",
            &format!(
                "{}: {} peaks in window [{}, {}]",
                p.name,
                p.peaks.len(),
                p.window.start_index,
                p.window.end_index
            ),
            &format!("{} distance={}", threshold, self.config.peak_distance),
        );
    }

    fn write_outputs(
        &mut self,
        spectra: &[ProcessedSpectrum],
        views: &[CompositeView],
    ) -> Result<Vec<PathBuf>, RamanError> {
        let selection = self.outputs.selection;
        let needs_dir = selection.any() || self.outputs.log_format.is_some();
        if needs_dir {
            ensure_dir(&self.outputs.dir)?;
        }

        let mut written = Vec::new();
        if selection.csv {
            for p in spectra {
                written.push(export::write_corrected_csv(&self.outputs.dir, p)?);
            }
        }
        if selection.json {
            let report = Report::new(&self.config, spectra, views);
            written.push(export::write_report(&self.outputs.dir, &report)?);
        }
        for path in &written {
            self.log.add_entry("Export", &path.display().to_string(), "");
        }
        Ok(written)
    }

    fn write_log(&self) -> Result<Option<PathBuf>, RamanError> {
        let Some(format) = self.outputs.log_format else {
            return Ok(None);
        };
        let path = self.outputs.dir.join(format.file_name());
        let result = match format {
            LogFormat::Text => self.log.save_text(&path),
            LogFormat::Json => self.log.save_json(&path),
            LogFormat::Script => self.log.save_script(&path),
        };
        result.map_err(|source| RamanError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {}", path.display());
        Ok(Some(path))
    }
}

fn ensure_dir(dir: &Path) -> Result<(), RamanError> {
    std::fs::create_dir_all(dir).map_err(|source| RamanError::Write {
        path: dir.to_path_buf(),
        source,
    })
}
