use std::path::PathBuf;

/// Errors raised while reading spectrum files or running a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed input at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unsupported file format '{extension}' for {path} (expected .mgf or .msp)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("{path} contains no spectra")]
    NoSpectra { path: PathBuf },

    #[error("Reference library not loaded")]
    NotLoaded,
}

impl SearchError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SearchError::Parse {
            line,
            message: message.into(),
        }
    }
}
