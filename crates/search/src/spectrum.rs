//! Parsed spectra and peak cleaning.

use std::collections::BTreeMap;

use entropy_core::search::Peak;

/// Relative intensity below which a peak is treated as noise.
pub const NOISE_THRESHOLD: f64 = 0.01;

/// Maximum number of peaks kept per spectrum after cleaning.
pub const MAX_PEAKS: usize = 500;

/// Peaks within this many Dalton below the precursor (and above it) are removed.
pub const PRECURSOR_REMOVAL_DA: f64 = 1.6;

/// A spectrum as read from an MGF or MSP file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    pub title: Option<String>,
    pub scan_number: Option<u32>,
    pub precursor_mz: Option<f64>,
    pub charge: Option<i32>,
    pub peaks: Vec<Peak>,
    pub metadata: BTreeMap<String, String>,
}

/// Clean raw peaks for similarity scoring.
///
/// Drops invalid peaks and everything from `precursor_mz - 1.6` upwards,
/// centroids peaks closer than `ms2_tolerance`, removes noise below 1% of the
/// base peak, keeps the [`MAX_PEAKS`] most intense peaks, and normalizes the
/// intensities to sum to 1. The output is sorted by m/z.
pub fn clean_peaks(peaks: &[Peak], precursor_mz: Option<f64>, ms2_tolerance: f64) -> Vec<Peak> {
    let mz_limit = precursor_mz.map(|mz| mz - PRECURSOR_REMOVAL_DA);

    let mut kept: Vec<Peak> = peaks
        .iter()
        .copied()
        .filter(|p| p.mz.is_finite() && p.intensity.is_finite())
        .filter(|p| p.mz > 0.0 && p.intensity > 0.0)
        .filter(|p| mz_limit.map_or(true, |limit| p.mz < limit))
        .collect();
    kept.sort_by(|a, b| a.mz.total_cmp(&b.mz));

    let mut centroided = centroid(kept, ms2_tolerance);

    let base = centroided
        .iter()
        .map(|p| p.intensity)
        .fold(0.0_f64, f64::max);
    centroided.retain(|p| p.intensity >= base * NOISE_THRESHOLD);

    if centroided.len() > MAX_PEAKS {
        centroided.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        centroided.truncate(MAX_PEAKS);
        centroided.sort_by(|a, b| a.mz.total_cmp(&b.mz));
    }

    normalize(&mut centroided);
    centroided
}

/// Merge neighbouring peaks (input sorted by m/z) closer than `tolerance`.
///
/// The merged m/z is intensity-weighted; intensities are summed.
fn centroid(sorted: Vec<Peak>, tolerance: f64) -> Vec<Peak> {
    let mut out: Vec<Peak> = Vec::with_capacity(sorted.len());
    for peak in sorted {
        match out.last_mut() {
            Some(last) if peak.mz - last.mz <= tolerance => {
                let total = last.intensity + peak.intensity;
                last.mz = (last.mz * last.intensity + peak.mz * peak.intensity) / total;
                last.intensity = total;
            }
            _ => out.push(peak),
        }
    }
    out
}

/// Scale intensities so they sum to 1. Leaves an all-zero spectrum untouched.
pub fn normalize(peaks: &mut [Peak]) {
    let total: f64 = peaks.iter().map(|p| p.intensity).sum();
    if total > 0.0 {
        for p in peaks.iter_mut() {
            p.intensity /= total;
        }
    }
}
