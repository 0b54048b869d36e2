use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One measured spectrum as loaded from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Display name, the file stem of the source
    pub name: String,
    pub source_path: PathBuf,
    /// Raman shift in cm⁻¹
    pub frequencies: Vec<f64>,
    pub intensities: Vec<f64>,
}

impl Spectrum {
    pub fn new(name: &str, frequencies: Vec<f64>, intensities: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            source_path: PathBuf::new(),
            frequencies,
            intensities,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// A detected peak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Index into the series the peak was detected on
    pub index: usize,
    pub frequency: f64,
    pub intensity: f64,
    /// Annotation text: the frequency rounded to an integer
    pub label: i64,
}

impl Peak {
    pub fn new(index: usize, frequency: f64, intensity: f64) -> Self {
        Self {
            index,
            frequency,
            intensity,
            label: frequency.round() as i64,
        }
    }
}

/// Sample-index bounds of the analysis window (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub start_index: usize,
    pub end_index: usize,
}

impl From<peak_core::WindowRange> for WindowBounds {
    fn from(w: peak_core::WindowRange) -> Self {
        Self {
            start_index: w.start_index,
            end_index: w.end_index,
        }
    }
}

/// How the baseline iteration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaselineTermination {
    Converged,
    DegenerateWeights,
    IterationCap,
}

impl From<pls_core::Termination> for BaselineTermination {
    fn from(t: pls_core::Termination) -> Self {
        match t {
            pls_core::Termination::Converged => BaselineTermination::Converged,
            pls_core::Termination::DegenerateWeights => BaselineTermination::DegenerateWeights,
            pls_core::Termination::IterationCap => BaselineTermination::IterationCap,
        }
    }
}

impl std::fmt::Display for BaselineTermination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineTermination::Converged => write!(f, "converged"),
            BaselineTermination::DegenerateWeights => write!(f, "degenerate weights"),
            BaselineTermination::IterationCap => write!(f, "iteration cap reached"),
        }
    }
}

/// Non-fatal conditions met while processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineWarning {
    /// The frequency bounds select no samples for this spectrum
    DegenerateWindow {
        spectrum: String,
        start_index: usize,
        end_index: usize,
    },
    /// A spectrum with no positive intensity cannot be max-normalized
    NotNormalizable { spectrum: String, maximum: f64 },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::DegenerateWindow {
                spectrum,
                start_index,
                end_index,
            } => write!(
                f,
                "{}: window [{}, {}] is empty, skipping peaks and views",
                spectrum, start_index, end_index
            ),
            PipelineWarning::NotNormalizable { spectrum, maximum } => write!(
                f,
                "{}: maximum intensity {} is not positive, left out of normalized views",
                spectrum, maximum
            ),
        }
    }
}

/// Full-length series after adjustment and baseline correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullSeries {
    /// Frequencies after the optional shift
    pub frequencies: Vec<f64>,
    /// Intensities after the optional multiplier
    pub raw: Vec<f64>,
    pub baseline: Vec<f64>,
    /// `raw - baseline + intensity_shift`
    pub corrected: Vec<f64>,
    /// Smoothed `corrected`
    pub filtered: Vec<f64>,
}

/// Everything the pipeline derives from one spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSpectrum {
    pub name: String,
    pub full: FullSeries,
    pub window: WindowBounds,
    pub windowed_frequencies: Vec<f64>,
    pub windowed_corrected: Vec<f64>,
    pub filtered_intensities: Vec<f64>,
    /// Height cutoff used for peak detection, absent for an empty window
    pub threshold: Option<f64>,
    pub peaks: Vec<Peak>,
    pub y_limits: Option<(f64, f64)>,
    pub baseline_iterations: usize,
    pub baseline_termination: BaselineTermination,
    pub warnings: Vec<PipelineWarning>,
}

impl ProcessedSpectrum {
    pub fn has_window(&self) -> bool {
        !self.windowed_frequencies.is_empty()
    }
}

/// Kinds of multi-spectrum view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    OverlayRaw,
    OverlayNormalized,
    StackedNormalized,
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::OverlayRaw => write!(f, "overlay"),
            ViewKind::OverlayNormalized => write!(f, "overlay (normalized)"),
            ViewKind::StackedNormalized => write!(f, "stacked (normalized)"),
        }
    }
}

/// One spectrum's contribution to a composite view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSeries {
    pub name: String,
    pub frequencies: Vec<f64>,
    pub intensities: Vec<f64>,
    /// Vertical offset already added to `intensities`
    pub offset: f64,
}

/// A multi-spectrum view with its own peak set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeView {
    pub kind: ViewKind,
    pub series: Vec<ViewSeries>,
    pub peaks: Vec<Peak>,
    /// Plot range over all series, offsets included; `None` when empty
    pub y_limits: Option<(f64, f64)>,
    pub warnings: Vec<PipelineWarning>,
}
