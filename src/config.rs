/// Processing configuration
///
/// One immutable `ProcessingConfig` is built from the command line,
/// validated once, and shared by every spectrum and view. It is
/// serializable so the report and the reproducibility log can carry the
/// exact parameters of a run.

use serde::{Deserialize, Serialize};

use crate::error::RamanError;
use peak_core::Threshold;
use pls_core::{ArplsOptions, Smoother};

pub const DEFAULT_PEAK_DISTANCE: usize = 8;

/// Smoothing filter applied after baseline correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SmoothingMethod {
    Whittaker { lambda: f64 },
    SavitzkyGolay { window_length: usize, poly_order: usize },
}

impl SmoothingMethod {
    /// Parse a `WINDOW_LENGTH:POLY_ORDER` pair, e.g. `"11:3"`.
    pub fn parse_window_poly(s: &str) -> Result<Self, RamanError> {
        let (wl, po) = s.split_once(':').ok_or_else(|| {
            RamanError::InvalidConfig(format!(
                "expected WINDOW_LENGTH:POLY_ORDER, got '{}'",
                s
            ))
        })?;
        let parse = |part: &str, what: &str| -> Result<usize, RamanError> {
            part.trim().parse::<usize>().map_err(|_| {
                RamanError::InvalidConfig(format!("{} must be a non-negative integer, got '{}'", what, part))
            })
        };
        Ok(SmoothingMethod::SavitzkyGolay {
            window_length: parse(wl, "window length")?,
            poly_order: parse(po, "polynomial order")?,
        })
    }

    pub fn to_smoother(&self) -> Smoother {
        match *self {
            SmoothingMethod::Whittaker { lambda } => Smoother::Whittaker { lambda },
            SmoothingMethod::SavitzkyGolay {
                window_length,
                poly_order,
            } => Smoother::SavitzkyGolay {
                window_length,
                poly_order,
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SmoothingMethod::Whittaker { lambda } => format!("Whittaker, lambda={}", lambda),
            SmoothingMethod::SavitzkyGolay {
                window_length,
                poly_order,
            } => format!(
                "Savitzky-Golay, window_length={}, polyorder={}",
                window_length, poly_order
            ),
        }
    }
}

impl Default for SmoothingMethod {
    fn default() -> Self {
        SmoothingMethod::Whittaker {
            lambda: pls_core::DEFAULT_WHITTAKER_LAMBDA,
        }
    }
}

/// Parameters shared by every spectrum of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// arPLS smoothness
    pub baseline_lambda: f64,
    pub convergence_ratio: f64,
    pub max_iterations: usize,
    pub smoothing: SmoothingMethod,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    /// Added to the corrected intensities
    pub intensity_shift: f64,
    /// Applied to the raw intensities before baseline estimation
    pub intensity_multiplier: Option<f64>,
    /// Added to the frequencies before baseline estimation
    pub frequency_shift: Option<f64>,
    /// Fixed peak height; absent means automatic
    pub threshold: Option<f64>,
    /// Minimum separation between peaks, in samples
    pub peak_distance: usize,
    /// Build the multi-spectrum views
    pub overlay: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            baseline_lambda: pls_core::DEFAULT_LAMBDA,
            convergence_ratio: pls_core::DEFAULT_RATIO,
            max_iterations: pls_core::DEFAULT_MAX_ITERATIONS,
            smoothing: SmoothingMethod::default(),
            xmin: None,
            xmax: None,
            intensity_shift: 0.0,
            intensity_multiplier: None,
            frequency_shift: None,
            threshold: None,
            peak_distance: DEFAULT_PEAK_DISTANCE,
            overlay: false,
        }
    }
}

impl ProcessingConfig {
    /// Reject parameter combinations no spectrum could be processed with.
    pub fn validate(&self) -> Result<(), RamanError> {
        check_lambda("baseline lambda", self.baseline_lambda)?;
        if !self.convergence_ratio.is_finite() || self.convergence_ratio < 0.0 {
            return Err(RamanError::InvalidConfig(format!(
                "convergence ratio must be finite and non-negative, got {}",
                self.convergence_ratio
            )));
        }
        if self.max_iterations == 0 {
            return Err(RamanError::InvalidConfig(
                "max iterations must be at least 1".to_string(),
            ));
        }
        match self.smoothing {
            SmoothingMethod::Whittaker { lambda } => check_lambda("Whittaker lambda", lambda)?,
            SmoothingMethod::SavitzkyGolay {
                window_length,
                poly_order,
            } => {
                if window_length % 2 == 0 {
                    return Err(RamanError::InvalidConfig(format!(
                        "Savitzky-Golay window length must be odd, got {}",
                        window_length
                    )));
                }
                if poly_order >= window_length {
                    return Err(RamanError::InvalidConfig(format!(
                        "Savitzky-Golay polynomial order {} must be less than the window length {}",
                        poly_order, window_length
                    )));
                }
            }
        }
        for (name, value) in [
            ("xmin", self.xmin),
            ("xmax", self.xmax),
            ("intensity multiplier", self.intensity_multiplier),
            ("frequency shift", self.frequency_shift),
            ("threshold", self.threshold),
            ("intensity shift", Some(self.intensity_shift)),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(RamanError::InvalidConfig(format!(
                        "{} must be finite, got {}",
                        name, v
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn arpls_options(&self) -> ArplsOptions {
        ArplsOptions {
            lambda: self.baseline_lambda,
            ratio: self.convergence_ratio,
            max_iterations: self.max_iterations,
        }
    }

    pub fn smoother(&self) -> Smoother {
        self.smoothing.to_smoother()
    }

    pub fn threshold_policy(&self) -> Threshold {
        Threshold::from_option(self.threshold)
    }
}

fn check_lambda(name: &str, lambda: f64) -> Result<(), RamanError> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(RamanError::InvalidConfig(format!(
            "{} must be finite and non-negative, got {}",
            name, lambda
        )));
    }
    Ok(())
}

/// Output artefacts requested with `-s`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSelection {
    /// `d`: windowed CSV per spectrum
    pub csv: bool,
    /// `j`: JSON report
    pub json: bool,
    /// `p`: raster figures, not produced by this tool
    pub png: bool,
}

impl OutputSelection {
    /// Letters are matched case-insensitively anywhere in `s`, so `"dat"`,
    /// `"d"` and `"pD"` are all accepted.
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        Self {
            csv: lower.contains('d'),
            json: lower.contains('j'),
            png: lower.contains('p'),
        }
    }

    pub fn any(&self) -> bool {
        self.csv || self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ProcessingConfig::default();
        assert_eq!(c.baseline_lambda, 1000.0);
        assert_eq!(c.peak_distance, 8);
        assert_eq!(c.smoothing, SmoothingMethod::Whittaker { lambda: 1.0 });
        assert_eq!(c.threshold_policy(), Threshold::Auto);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_parse_window_poly() {
        assert_eq!(
            SmoothingMethod::parse_window_poly("11:3").unwrap(),
            SmoothingMethod::SavitzkyGolay {
                window_length: 11,
                poly_order: 3
            }
        );
        assert!(SmoothingMethod::parse_window_poly("11").is_err());
        assert!(SmoothingMethod::parse_window_poly("a:3").is_err());
        assert!(SmoothingMethod::parse_window_poly("11:-1").is_err());
    }

    #[test]
    fn test_validate_savgol() {
        let mut c = ProcessingConfig {
            smoothing: SmoothingMethod::SavitzkyGolay {
                window_length: 10,
                poly_order: 3,
            },
            ..ProcessingConfig::default()
        };
        assert!(matches!(c.validate(), Err(RamanError::InvalidConfig(_))));
        c.smoothing = SmoothingMethod::SavitzkyGolay {
            window_length: 5,
            poly_order: 5,
        };
        assert!(c.validate().is_err());
        c.smoothing = SmoothingMethod::SavitzkyGolay {
            window_length: 5,
            poly_order: 2,
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_lambda() {
        let c = ProcessingConfig {
            baseline_lambda: -1.0,
            ..ProcessingConfig::default()
        };
        assert!(c.validate().is_err());
        let c = ProcessingConfig {
            smoothing: SmoothingMethod::Whittaker { lambda: f64::NAN },
            ..ProcessingConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_output_selection() {
        let s = OutputSelection::parse("pd");
        assert!(s.csv && s.png && !s.json);
        let s = OutputSelection::parse("J");
        assert!(s.json && !s.csv);
        assert!(!OutputSelection::parse("").any());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let c = ProcessingConfig {
            smoothing: SmoothingMethod::SavitzkyGolay {
                window_length: 7,
                poly_order: 2,
            },
            xmin: Some(200.0),
            threshold: Some(40.0),
            ..ProcessingConfig::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"method\":\"savitzky_golay\""));
        let back: ProcessingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
