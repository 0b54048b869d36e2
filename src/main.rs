#![allow(dead_code)]

mod app;
mod config;
mod data;
mod error;
mod log;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use app::{LogFormat, OutputOptions, RamanApp};
use config::{OutputSelection, ProcessingConfig, SmoothingMethod};
use error::RamanError;

#[derive(Parser, Debug)]
#[command(
    name = "raman-tl",
    version,
    about = "Baseline correction, smoothing and peak detection for Raman spectra"
)]
struct Cli {
    /// Spectrum files: two whitespace-separated columns, frequency and intensity
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// arPLS baseline smoothness
    #[arg(short = 'l', long = "lambda", default_value_t = 1000)]
    lambda: i64,

    /// Use Savitzky-Golay smoothing: WINDOW_LENGTH:POLY_ORDER, e.g. 11:3
    #[arg(short = 'p', long = "wp", value_name = "WL:PO")]
    wp: Option<String>,

    /// Whittaker smoothing lambda (ignored with --wp)
    #[arg(short = 'w', long, default_value_t = 1.0, allow_hyphen_values = true)]
    whittaker: f64,

    /// Lower frequency bound of the analysis window
    #[arg(long, allow_hyphen_values = true)]
    xmin: Option<f64>,

    /// Upper frequency bound of the analysis window
    #[arg(long, allow_hyphen_values = true)]
    xmax: Option<f64>,

    /// Fixed minimum peak height (sign ignored); automatic when absent
    #[arg(short = 't', long, allow_hyphen_values = true)]
    threshold: Option<i64>,

    /// Multiply raw intensities by the magnitude of this factor
    #[arg(short = 'm', long, allow_hyphen_values = true)]
    multiply: Option<f64>,

    /// Add this value to every frequency
    #[arg(short = 'a', long, allow_hyphen_values = true)]
    add: Option<f64>,

    /// Add this value to the corrected intensities
    #[arg(short = 'i', long, default_value_t = 0.0, allow_hyphen_values = true)]
    intensities: f64,

    /// Minimum separation between peaks, in samples
    #[arg(long, default_value_t = config::DEFAULT_PEAK_DISTANCE)]
    distance: usize,

    /// Build overlay, normalized and stacked views of all spectra
    #[arg(short = 'o', long, default_value_t = false)]
    overlay: bool,

    /// Outputs to write: d (CSV per spectrum), j (JSON report), p (PNG, unsupported)
    #[arg(short = 's', long, value_name = "LETTERS")]
    save: Option<String>,

    /// Skip PDF figures (figures are rendered outside raman-tl)
    #[arg(short = 'n', long, default_value_t = false)]
    nosave: bool,

    /// Directory for all written files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the detected peaks of every spectrum and view
    #[arg(long, default_value_t = false)]
    show_summary: bool,

    /// Write the reproducibility log into the output directory
    #[arg(long, value_enum)]
    log: Option<LogFormat>,
}

impl Cli {
    fn processing_config(&self) -> Result<ProcessingConfig, RamanError> {
        let smoothing = match &self.wp {
            Some(wp) => SmoothingMethod::parse_window_poly(wp)?,
            None => SmoothingMethod::Whittaker {
                lambda: self.whittaker,
            },
        };
        Ok(ProcessingConfig {
            baseline_lambda: self.lambda as f64,
            smoothing,
            xmin: self.xmin,
            xmax: self.xmax,
            intensity_shift: self.intensities,
            intensity_multiplier: self.multiply,
            frequency_shift: self.add,
            threshold: self.threshold.map(|t| t as f64),
            peak_distance: self.distance,
            overlay: self.overlay,
            ..ProcessingConfig::default()
        })
    }

    fn output_options(&self) -> OutputOptions {
        OutputOptions {
            dir: self.output_dir.clone(),
            selection: self
                .save
                .as_deref()
                .map(OutputSelection::parse)
                .unwrap_or_default(),
            show_summary: self.show_summary,
            log_format: self.log,
        }
    }
}

fn run(cli: &Cli) -> Result<(), RamanError> {
    let config = cli.processing_config()?;
    if cli.nosave {
        ::log::debug!("--nosave: no figures are rendered by raman-tl");
    }

    let mut app = RamanApp::new(config, cli.output_options())?;
    app.log_mut().set_command_line(std::env::args_os());
    let outcome = app.run(&cli.files)?;

    ::log::info!(
        "Processed {} spectra, {} views, {} files written",
        outcome.spectra.len(),
        outcome.views.len(),
        outcome.written.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    ::log::info!("Starting raman-tl v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let msg = e.chain();
            if e.is_input_error() {
                ::log::error!("Input error: {}", msg);
            } else {
                ::log::error!("{}", msg);
            }
            ExitCode::FAILURE
        }
    }
}
