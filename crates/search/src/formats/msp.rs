//! NIST MSP text library reader.
//!
//! Records are separated by blank lines. Each record is a run of
//! `Key: Value` headers followed by peak lines. Peak lines may hold one
//! `mz intensity` pair (optionally with a quoted annotation) or several
//! pairs separated by `;`.

use crate::error::SearchError;
use crate::formats::{parse_charge, parse_leading_f64, parse_peak, parse_scan};
use crate::spectrum::Spectrum;

/// A record being assembled.
struct Record {
    start_line: usize,
    spectrum: Spectrum,
    expected_peaks: Option<usize>,
}

impl Record {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            spectrum: Spectrum::default(),
            expected_peaks: None,
        }
    }

    fn finish(self) -> Result<Spectrum, SearchError> {
        if let Some(expected) = self.expected_peaks {
            let found = self.spectrum.peaks.len();
            if expected != found {
                return Err(SearchError::parse(
                    self.start_line,
                    format!("record declares {expected} peaks but contains {found}"),
                ));
            }
        }
        Ok(self.spectrum)
    }
}

/// Parse MSP text into spectra, in file order.
pub fn parse(content: &str) -> Result<Vec<Spectrum>, SearchError> {
    let mut spectra = Vec::new();
    let mut current: Option<Record> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            if let Some(record) = current.take() {
                spectra.push(record.finish()?);
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let record = current.get_or_insert_with(|| Record::new(line_no));

        if line.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            for pair in line.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                record.spectrum.peaks.push(parse_peak(pair, line_no)?);
            }
        } else if let Some((key, value)) = line.split_once(':') {
            apply_header(record, key.trim(), value.trim(), line_no)?;
        } else {
            return Err(SearchError::parse(
                line_no,
                format!("expected 'Key: Value' or a peak line, got '{line}'"),
            ));
        }
    }

    if let Some(record) = current {
        spectra.push(record.finish()?);
    }

    Ok(spectra)
}

fn apply_header(
    record: &mut Record,
    key: &str,
    value: &str,
    line_no: usize,
) -> Result<(), SearchError> {
    let normalized: String = key
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .collect::<String>()
        .to_ascii_lowercase();
    let spectrum = &mut record.spectrum;

    match normalized.as_str() {
        "name" | "title" => spectrum.title = Some(value.to_string()),
        "precursormz" | "pepmass" => {
            let mz = parse_leading_f64(value).ok_or_else(|| {
                SearchError::parse(line_no, format!("invalid precursor m/z '{value}'"))
            })?;
            spectrum.precursor_mz = Some(mz);
        }
        "charge" => match parse_charge(value) {
            Some(charge) => spectrum.charge = Some(charge),
            None => {
                spectrum.metadata.insert("charge".to_string(), value.to_string());
            }
        },
        "precursortype" => {
            if spectrum.charge.is_none() {
                spectrum.charge = charge_from_adduct(value);
            }
            spectrum
                .metadata
                .insert("precursor_type".to_string(), value.to_string());
        }
        "scan" | "scans" | "scannumber" => match parse_scan(value) {
            Some(scan) => spectrum.scan_number = Some(scan),
            None => {
                spectrum.metadata.insert("scans".to_string(), value.to_string());
            }
        },
        "numpeaks" => {
            let count = value.parse::<usize>().map_err(|_| {
                SearchError::parse(line_no, format!("invalid peak count '{value}'"))
            })?;
            record.expected_peaks = Some(count);
        }
        _ => {
            spectrum
                .metadata
                .insert(key.to_ascii_lowercase(), value.to_string());
        }
    }
    Ok(())
}

/// Charge implied by an adduct such as `[M+H]+` or `[M-2H]2-`: the sign run
/// after the closing bracket, with an optional leading magnitude.
fn charge_from_adduct(adduct: &str) -> Option<i32> {
    let (_, suffix) = adduct.trim().rsplit_once(']')?;
    let suffix = suffix.trim();
    let sign = match suffix.chars().last()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits = suffix.trim_end_matches(['+', '-']);
    let magnitude = if digits.is_empty() {
        i32::try_from(suffix.len()).ok()?
    } else {
        digits.parse().ok()?
    };
    Some(sign * magnitude)
}
