//! Spectrum file readers.
//!
//! The format is picked from the file extension (case-insensitive):
//! `.mgf` (Mascot Generic Format) or `.msp` (NIST text library).

pub mod mgf;
pub mod msp;

use std::path::Path;

use entropy_core::search::Peak;

use crate::error::SearchError;
use crate::spectrum::Spectrum;

/// Supported spectrum file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumFormat {
    Mgf,
    Msp,
}

impl SpectrumFormat {
    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, SearchError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "mgf" => Ok(SpectrumFormat::Mgf),
            "msp" => Ok(SpectrumFormat::Msp),
            _ => Err(SearchError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Read every spectrum in `path`. Fails if the file holds no spectra.
pub fn read_spectra(path: &Path) -> Result<Vec<Spectrum>, SearchError> {
    let format = SpectrumFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let spectra = match format {
        SpectrumFormat::Mgf => mgf::parse(&content)?,
        SpectrumFormat::Msp => msp::parse(&content)?,
    };

    if spectra.is_empty() {
        return Err(SearchError::NoSpectra {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(path = %path.display(), count = spectra.len(), "Read spectra");
    Ok(spectra)
}

// ---------------------------------------------------------------------------
// Shared field parsers
// ---------------------------------------------------------------------------

/// Parse a `mz intensity` pair. Extra columns (annotations) are ignored.
pub(crate) fn parse_peak(text: &str, line: usize) -> Result<Peak, SearchError> {
    let mut fields = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty());

    let (Some(mz), Some(intensity)) = (fields.next(), fields.next()) else {
        return Err(SearchError::parse(
            line,
            format!("expected 'mz intensity', got '{text}'"),
        ));
    };

    match (mz.parse::<f64>(), intensity.parse::<f64>()) {
        (Ok(mz), Ok(intensity)) => Ok(Peak { mz, intensity }),
        _ => Err(SearchError::parse(
            line,
            format!("invalid peak values in '{text}'"),
        )),
    }
}

/// Parse a charge such as `2+`, `+2`, `3-` or `1`. Takes the first listed
/// charge when several are given (`2+ and 3+`).
pub(crate) fn parse_charge(text: &str) -> Option<i32> {
    let first = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .find(|f| !f.is_empty())?;
    let negative = first.starts_with('-') || first.ends_with('-');
    let magnitude: i32 = first.trim_matches(|c| c == '+' || c == '-').parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a scan number. Ranges (`100-102`) and lists (`7,8`) yield the first.
pub(crate) fn parse_scan(text: &str) -> Option<u32> {
    text.split(|c: char| c == '-' || c == ',' || c.is_whitespace())
        .find(|f| !f.is_empty())?
        .parse()
        .ok()
}

/// Parse the leading number of a field such as `PEPMASS=445.12 1200.0`.
pub(crate) fn parse_leading_f64(text: &str) -> Option<f64> {
    text.split_whitespace().next()?.parse().ok()
}
