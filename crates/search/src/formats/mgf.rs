//! Mascot Generic Format reader.
//!
//! ```text
//! BEGIN IONS
//! TITLE=caffeine
//! PEPMASS=195.0877
//! CHARGE=1+
//! SCANS=12
//! 110.0713 35.2
//! 138.0662 100.0
//! END IONS
//! ```

use crate::error::SearchError;
use crate::formats::{parse_charge, parse_leading_f64, parse_peak, parse_scan};
use crate::spectrum::Spectrum;

/// Parse MGF text into spectra, in file order.
pub fn parse(content: &str) -> Result<Vec<Spectrum>, SearchError> {
    let mut spectra = Vec::new();
    let mut current: Option<(usize, Spectrum)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with(|c: char| matches!(c, '#' | ';' | '!')) {
            continue;
        }

        if line.eq_ignore_ascii_case("BEGIN IONS") {
            if current.is_some() {
                return Err(SearchError::parse(
                    line_no,
                    "BEGIN IONS inside an unterminated block",
                ));
            }
            current = Some((line_no, Spectrum::default()));
            continue;
        }

        if line.eq_ignore_ascii_case("END IONS") {
            match current.take() {
                Some((_, spectrum)) => spectra.push(spectrum),
                None => {
                    return Err(SearchError::parse(
                        line_no,
                        "END IONS without a matching BEGIN IONS",
                    ))
                }
            }
            continue;
        }

        let Some((_, spectrum)) = current.as_mut() else {
            return Err(SearchError::parse(
                line_no,
                format!("unexpected content outside of a BEGIN IONS block: '{line}'"),
            ));
        };

        match line.split_once('=') {
            Some((key, value)) => apply_header(spectrum, key.trim(), value.trim(), line_no)?,
            None => spectrum.peaks.push(parse_peak(line, line_no)?),
        }
    }

    if let Some((start, _)) = current {
        return Err(SearchError::parse(
            start,
            "BEGIN IONS block is never closed with END IONS",
        ));
    }

    Ok(spectra)
}

fn apply_header(
    spectrum: &mut Spectrum,
    key: &str,
    value: &str,
    line_no: usize,
) -> Result<(), SearchError> {
    match key.to_ascii_uppercase().as_str() {
        "TITLE" => spectrum.title = Some(value.to_string()),
        "PEPMASS" | "PRECURSOR_MZ" => {
            let mz = parse_leading_f64(value).ok_or_else(|| {
                SearchError::parse(line_no, format!("invalid precursor m/z '{value}'"))
            })?;
            spectrum.precursor_mz = Some(mz);
        }
        "CHARGE" => match parse_charge(value) {
            Some(charge) => spectrum.charge = Some(charge),
            None => {
                spectrum.metadata.insert("charge".to_string(), value.to_string());
            }
        },
        "SCANS" | "SCAN" | "SCAN_NUMBER" => match parse_scan(value) {
            Some(scan) => spectrum.scan_number = Some(scan),
            None => {
                spectrum.metadata.insert("scans".to_string(), value.to_string());
            }
        },
        _ => {
            spectrum
                .metadata
                .insert(key.to_ascii_lowercase(), value.to_string());
        }
    }
    Ok(())
}
