/// Two-column spectrum files
///
/// Each non-blank line holds a frequency and an intensity separated by
/// whitespace. Further columns are ignored. The file stem names the
/// spectrum.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::spectrum::Spectrum;
use crate::error::RamanError;

/// Spectrum name for a file: its stem, or the whole path if it has none.
pub fn spectrum_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the text of a two-column file.
pub fn parse_two_column(content: &str, path: &Path) -> Result<Spectrum, RamanError> {
    let mut frequencies = Vec::new();
    let mut intensities = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };
        let second = fields.next().ok_or_else(|| RamanError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            reason: "missing intensity column".to_string(),
        })?;

        frequencies.push(parse_value(first, "frequency", path, line_no)?);
        intensities.push(parse_value(second, "intensity", path, line_no)?);
    }

    let mut spectrum = Spectrum::new(&spectrum_name(path), frequencies, intensities);
    spectrum.source_path = path.to_path_buf();
    Ok(spectrum)
}

fn parse_value(field: &str, what: &str, path: &Path, line: usize) -> Result<f64, RamanError> {
    field.parse::<f64>().map_err(|_| RamanError::Parse {
        path: path.to_path_buf(),
        line,
        reason: format!("{} '{}' is not a number", what, field),
    })
}

/// Read and parse one spectrum file.
pub fn load_spectrum(path: &Path) -> Result<Spectrum, RamanError> {
    let content = std::fs::read_to_string(path).map_err(|source| RamanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let spectrum = parse_two_column(&content, path)?;
    log::debug!("Loaded {} ({} points)", spectrum.name, spectrum.len());
    Ok(spectrum)
}

/// Load every file, in order; names must be unique.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<Spectrum>, RamanError> {
    let mut seen = HashSet::new();
    let mut spectra = Vec::with_capacity(paths.len());
    for path in paths {
        let spectrum = load_spectrum(path)?;
        if !seen.insert(spectrum.name.clone()) {
            return Err(RamanError::DuplicateName {
                name: spectrum.name,
                path: path.clone(),
            });
        }
        spectra.push(spectrum);
    }
    Ok(spectra)
}
