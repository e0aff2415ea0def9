//! Spectral entropy search worker.
//!
//! Loads a reference library once, then scores every query spectrum against
//! it twice: an identity search restricted to library spectra with a matching
//! precursor m/z, and an open search over the whole library.

use std::path::Path;

use entropy_core::search::{
    Peak, QueryResult, SearchParams, SearchReport, SearchWorker, SpectrumHit, WorkerError,
    WorkerFactory,
};

use crate::entropy::{entropy_similarity, entropy_weighted};
use crate::error::SearchError;
use crate::formats::read_spectra;
use crate::library::{LibraryEntry, SpectralLibrary};
use crate::spectrum::{clean_peaks, Spectrum};

/// Search worker backed by an in-memory [`SpectralLibrary`].
#[derive(Debug)]
pub struct EntropySearchWorker {
    ms2_tolerance: f64,
    library: Option<SpectralLibrary>,
}

impl EntropySearchWorker {
    pub fn new(ms2_tolerance: f64) -> Self {
        Self {
            ms2_tolerance,
            library: None,
        }
    }

    pub fn library(&self) -> Option<&SpectralLibrary> {
        self.library.as_ref()
    }

    /// Read and index the reference library at `path`.
    pub fn load_library(&mut self, path: &Path) -> Result<(), SearchError> {
        let spectra = read_spectra(path)?;
        let library = SpectralLibrary::build(spectra, self.ms2_tolerance);
        tracing::debug!(
            path = %path.display(),
            spectra = library.len(),
            "Reference library loaded",
        );
        self.library = Some(library);
        Ok(())
    }

    /// Score every spectrum in `query_path` against the loaded library.
    pub fn search_file(
        &self,
        query_path: &Path,
        params: &SearchParams,
    ) -> Result<SearchReport, SearchError> {
        let library = self.library.as_ref().ok_or(SearchError::NotLoaded)?;
        let queries = read_spectra(query_path)?;

        let spectra = queries
            .into_iter()
            .map(|query| search_one(library, query, params))
            .collect::<Vec<_>>();

        tracing::debug!(
            path = %query_path.display(),
            queries = spectra.len(),
            "Query file searched",
        );
        Ok(SearchReport { spectra })
    }
}

fn search_one(library: &SpectralLibrary, query: Spectrum, params: &SearchParams) -> QueryResult {
    let cleaned = clean_peaks(&query.peaks, query.precursor_mz, params.ms2_tolerance);
    let weighted = entropy_weighted(&cleaned);

    let identity_search = match query.precursor_mz {
        Some(mz) => rank(
            library.precursor_window(mz, params.ms1_tolerance),
            &weighted,
            params,
        ),
        None => Vec::new(),
    };
    let open_search = rank(library.entries(), &weighted, params);

    QueryResult {
        scan_number: query.scan_number,
        title: query.title,
        precursor_mz: query.precursor_mz,
        charge: query.charge,
        peaks: cleaned,
        metadata: query.metadata,
        identity_search,
        open_search,
    }
}

/// Score `candidates`, keep positive scores, best `top_n` first.
fn rank(
    candidates: &[LibraryEntry],
    query: &[Peak],
    params: &SearchParams,
) -> Vec<SpectrumHit> {
    let mut hits: Vec<SpectrumHit> = candidates
        .iter()
        .filter_map(|entry| {
            let similarity = entropy_similarity(query, &entry.peaks, params.ms2_tolerance);
            (similarity > 0.0).then(|| SpectrumHit {
                library_index: entry.index,
                library_title: entry.title.clone(),
                library_precursor_mz: entry.precursor_mz,
                similarity,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then(a.library_index.cmp(&b.library_index))
    });
    hits.truncate(params.top_n);
    hits
}

impl SearchWorker for EntropySearchWorker {
    fn load_reference(&mut self, path: &Path) -> Result<(), WorkerError> {
        self.load_library(path)
            .map_err(|e| WorkerError::Load(e.to_string()))
    }

    fn search(
        &mut self,
        query_path: &Path,
        params: &SearchParams,
    ) -> Result<SearchReport, WorkerError> {
        self.search_file(query_path, params)
            .map_err(|e| WorkerError::Search(e.to_string()))
    }
}

/// Creates one [`EntropySearchWorker`] per job.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyWorkerFactory;

impl WorkerFactory for EntropyWorkerFactory {
    fn create(&self, params: &SearchParams) -> Box<dyn SearchWorker> {
        Box::new(EntropySearchWorker::new(params.ms2_tolerance))
    }
}
