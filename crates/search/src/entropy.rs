//! Spectral entropy and entropy similarity.
//!
//! Peaks passed to these functions are expected to be cleaned with
//! [`crate::spectrum::clean_peaks`]: sorted by m/z, intensities summing to 1.

use std::f64::consts::LN_2;

use entropy_core::search::Peak;

use crate::spectrum::normalize;

/// Spectra with an entropy at or above this value are not reweighted.
pub const WEIGHT_ENTROPY_CUTOFF: f64 = 3.0;

/// Shannon entropy `-sum(p * ln p)` of the intensity distribution.
pub fn spectral_entropy(peaks: &[Peak]) -> f64 {
    let total: f64 = peaks.iter().map(|p| p.intensity).sum();
    if total <= 0.0 {
        return 0.0;
    }
    -peaks
        .iter()
        .map(|p| p.intensity / total)
        .filter(|p| *p > 0.0)
        .map(|p| p * p.ln())
        .sum::<f64>()
}

/// Apply entropy-based intensity weighting.
///
/// Low-entropy spectra (dominated by a few peaks) have their intensities
/// raised to `0.25 + 0.25 * S` and renormalized.
pub fn entropy_weighted(peaks: &[Peak]) -> Vec<Peak> {
    let mut weighted = peaks.to_vec();
    let entropy = spectral_entropy(peaks);
    if entropy < WEIGHT_ENTROPY_CUTOFF {
        let weight = 0.25 + 0.25 * entropy;
        for p in weighted.iter_mut() {
            p.intensity = p.intensity.powf(weight);
        }
        normalize(&mut weighted);
    }
    weighted
}

/// Unweighted entropy similarity of two cleaned spectra, in `0.0..=1.0`.
///
/// Peaks are paired greedily in m/z order when they lie within `tolerance`;
/// each peak is used at most once. Only matched pairs contribute:
/// `sum((a + b) ln(a + b) - a ln a - b ln b) / ln 4`.
pub fn entropy_similarity(a: &[Peak], b: &[Peak], tolerance: f64) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let diff = b[j].mz - a[i].mz;
        if diff.abs() <= tolerance {
            score += pair_contribution(a[i].intensity, b[j].intensity);
            i += 1;
            j += 1;
        } else if diff > 0.0 {
            i += 1;
        } else {
            j += 1;
        }
    }

    (score / (2.0 * LN_2)).clamp(0.0, 1.0)
}

fn pair_contribution(a: f64, b: f64) -> f64 {
    x_ln_x(a + b) - x_ln_x(a) - x_ln_x(b)
}

fn x_ln_x(x: f64) -> f64 {
    if x > 0.0 {
        x * x.ln()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::clean_peaks;

    fn spectrum(peaks: &[(f64, f64)]) -> Vec<Peak> {
        let raw: Vec<Peak> = peaks
            .iter()
            .map(|&(mz, intensity)| Peak { mz, intensity })
            .collect();
        entropy_weighted(&clean_peaks(&raw, None, 0.02))
    }

    #[test]
    fn entropy_of_single_peak_is_zero() {
        let peaks = [Peak {
            mz: 100.0,
            intensity: 1.0,
        }];
        assert_eq!(spectral_entropy(&peaks), 0.0);
    }

    #[test]
    fn entropy_of_uniform_peaks_is_ln_n() {
        let peaks: Vec<Peak> = (0..4)
            .map(|i| Peak {
                mz: 100.0 + i as f64,
                intensity: 0.25,
            })
            .collect();
        assert!((spectral_entropy(&peaks) - 4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn weighting_flattens_low_entropy_spectra() {
        let raw = spectrum(&[(100.0, 90.0), (200.0, 10.0)]);
        assert!(raw[1].intensity > 0.1, "minor peak should gain weight");
        assert!((raw.iter().map(|p| p.intensity).sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identical_spectra_score_one() {
        let a = spectrum(&[(100.0, 10.0), (150.0, 50.0), (200.0, 40.0)]);
        let sim = entropy_similarity(&a, &a, 0.02);
        assert!((sim - 1.0).abs() < 1e-9, "got {sim}");
    }

    #[test]
    fn disjoint_spectra_score_zero() {
        let a = spectrum(&[(100.0, 10.0), (150.0, 50.0)]);
        let b = spectrum(&[(300.0, 10.0), (350.0, 50.0)]);
        assert_eq!(entropy_similarity(&a, &b, 0.02), 0.0);
    }

    #[test]
    fn partial_overlap_scores_between_zero_and_one() {
        let a = spectrum(&[(100.0, 10.0), (150.0, 50.0), (200.0, 40.0)]);
        let b = spectrum(&[(100.01, 10.0), (150.0, 50.0), (260.0, 40.0)]);
        let sim = entropy_similarity(&a, &b, 0.02);
        assert!(sim > 0.0 && sim < 1.0, "got {sim}");
        assert!((sim - entropy_similarity(&b, &a, 0.02)).abs() < 1e-12);
    }

    #[test]
    fn tolerance_controls_matching() {
        let a = spectrum(&[(100.0, 1.0)]);
        let b = spectrum(&[(100.05, 1.0)]);
        assert_eq!(entropy_similarity(&a, &b, 0.02), 0.0);
        assert!(entropy_similarity(&a, &b, 0.1) > 0.99);
    }

    #[test]
    fn empty_spectra_score_zero() {
        let a = spectrum(&[(100.0, 1.0)]);
        assert_eq!(entropy_similarity(&a, &[], 0.02), 0.0);
        assert_eq!(entropy_similarity(&[], &a, 0.02), 0.0);
    }
}
