//! Search inputs, the search report, and the collaborator seams the job
//! orchestrator drives (search worker, worker factory, result projector).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default precursor (MS1) m/z tolerance in Dalton.
pub const DEFAULT_MS1_TOLERANCE: f64 = 0.01;

/// Default fragment (MS2) m/z tolerance in Dalton.
pub const DEFAULT_MS2_TOLERANCE: f64 = 0.02;

/// Default number of hits kept per query spectrum.
pub const DEFAULT_TOP_N: usize = 100;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Numeric parameters of one search, passed through to the worker unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub ms1_tolerance: f64,
    pub ms2_tolerance: f64,
    pub top_n: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            ms1_tolerance: DEFAULT_MS1_TOLERANCE,
            ms2_tolerance: DEFAULT_MS2_TOLERANCE,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl SearchParams {
    /// Validate the parameters.
    ///
    /// Rules:
    /// - Both tolerances must be finite and strictly positive.
    /// - `top_n` must be at least 1.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_tolerance("ms1_tolerance", self.ms1_tolerance)?;
        validate_tolerance("ms2_tolerance", self.ms2_tolerance)?;
        if self.top_n == 0 {
            return Err(CoreError::Validation(
                "top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_tolerance(name: &str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

/// Everything a job needs to run: the two materialized datasets plus params.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchInputs {
    pub query_path: PathBuf,
    pub reference_path: PathBuf,
    pub params: SearchParams,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A single centroided fragment peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: f64,
    pub intensity: f64,
}

/// A library spectrum matched against a query spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumHit {
    /// Position of the spectrum in the reference library file.
    pub library_index: usize,
    pub library_title: Option<String>,
    pub library_precursor_mz: Option<f64>,
    /// Entropy similarity in `0.0..=1.0`.
    pub similarity: f64,
}

/// Search outcome for one query spectrum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub scan_number: Option<u32>,
    pub title: Option<String>,
    pub precursor_mz: Option<f64>,
    pub charge: Option<i32>,
    /// Cleaned peaks of the query spectrum.
    pub peaks: Vec<Peak>,
    /// Header fields not mapped to a dedicated field above.
    pub metadata: BTreeMap<String, String>,
    /// Hits among library spectra with a matching precursor m/z.
    pub identity_search: Vec<SpectrumHit>,
    /// Hits among all library spectra, regardless of precursor m/z.
    pub open_search: Vec<SpectrumHit>,
}

/// Raw output of a search worker. Opaque to the job orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub spectra: Vec<QueryResult>,
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Failure raised by a search worker while a job runs.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Failed to load reference library: {0}")]
    Load(String),

    #[error("Failed to search query file: {0}")]
    Search(String),
}

/// Blocking search workload. One instance serves exactly one job.
///
/// Calls are made sequentially from a blocking thread: first
/// `load_reference`, then `search`.
pub trait SearchWorker: Send {
    fn load_reference(&mut self, path: &Path) -> Result<(), WorkerError>;

    fn search(
        &mut self,
        query_path: &Path,
        params: &SearchParams,
    ) -> Result<SearchReport, WorkerError>;
}

/// Builds a fresh worker for each job.
pub trait WorkerFactory: Send + Sync {
    fn create(&self, params: &SearchParams) -> Box<dyn SearchWorker>;
}

/// Projects a finished report into a display-safe, serializable value.
pub trait ResultProjector: Send + Sync {
    fn project(&self, report: &SearchReport) -> serde_json::Value;
}
