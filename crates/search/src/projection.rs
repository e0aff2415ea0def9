//! Display-safe projection of a finished [`SearchReport`].
//!
//! Raw peak lists and the raw hit arrays stay server-side; the projection
//! keeps spectrum metadata and a compact summary of each hit. Query spectra
//! without a scan number are left out.

use entropy_core::search::{ResultProjector, SearchReport, SpectrumHit};
use serde_json::{json, Value};

/// Decimal places kept for similarity scores.
const SIMILARITY_DECIMALS: i32 = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayProjector;

impl ResultProjector for DisplayProjector {
    fn project(&self, report: &SearchReport) -> Value {
        let spectra: Vec<Value> = report
            .spectra
            .iter()
            .filter_map(|query| {
                let scan_number = query.scan_number?;
                Some(json!({
                    "scan_number": scan_number,
                    "title": query.title,
                    "precursor_mz": query.precursor_mz,
                    "charge": query.charge,
                    "peak_count": query.peaks.len(),
                    "metadata": query.metadata,
                    "identity_matches": project_hits(&query.identity_search),
                    "open_matches": project_hits(&query.open_search),
                }))
            })
            .collect();
        Value::Array(spectra)
    }
}

fn project_hits(hits: &[SpectrumHit]) -> Vec<Value> {
    hits.iter()
        .map(|hit| {
            json!({
                "library_title": hit.library_title,
                "library_precursor_mz": hit.library_precursor_mz,
                "similarity": round(hit.similarity),
            })
        })
        .collect()
}

fn round(value: f64) -> f64 {
    let factor = 10f64.powi(SIMILARITY_DECIMALS);
    (value * factor).round() / factor
}
