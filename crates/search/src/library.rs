use entropy_core::search::Peak;

use crate::entropy::entropy_weighted;
use crate::spectrum::{clean_peaks, Spectrum};

/// One reference spectrum, cleaned and entropy-weighted for scoring.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// Position in the source file.
    pub index: usize,
    pub title: Option<String>,
    pub precursor_mz: Option<f64>,
    pub peaks: Vec<Peak>,
}

/// Reference spectra ordered by precursor m/z (entries without one last).
#[derive(Debug, Clone, Default)]
pub struct SpectralLibrary {
    entries: Vec<LibraryEntry>,
}

impl SpectralLibrary {
    /// Clean, weight and index `spectra`.
    pub fn build(spectra: Vec<Spectrum>, ms2_tolerance: f64) -> Self {
        let mut entries: Vec<LibraryEntry> = spectra
            .into_iter()
            .enumerate()
            .map(|(index, spectrum)| {
                let cleaned = clean_peaks(&spectrum.peaks, spectrum.precursor_mz, ms2_tolerance);
                LibraryEntry {
                    index,
                    title: spectrum.title,
                    precursor_mz: spectrum.precursor_mz,
                    peaks: entropy_weighted(&cleaned),
                }
            })
            .collect();
        entries.sort_by(|a, b| sort_key(a).total_cmp(&sort_key(b)));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Entries whose precursor m/z lies within `tolerance` of `mz`.
    pub fn precursor_window(&self, mz: f64, tolerance: f64) -> &[LibraryEntry] {
        let lo = self
            .entries
            .partition_point(|e| sort_key(e) < mz - tolerance);
        let hi = self
            .entries
            .partition_point(|e| sort_key(e) <= mz + tolerance);
        &self.entries[lo..hi.max(lo)]
    }
}

fn sort_key(entry: &LibraryEntry) -> f64 {
    entry.precursor_mz.unwrap_or(f64::INFINITY)
}
