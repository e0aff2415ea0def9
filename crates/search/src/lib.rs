//! Spectral entropy library search.
//!
//! Implements the search-worker and result-projection seams declared in
//! `entropy_core::search`:
//!
//! - `formats`: MGF and MSP readers
//! - `spectrum`: peak cleaning
//! - `entropy`: spectral entropy and entropy similarity
//! - `library`: precursor-indexed reference library
//! - `worker`: [`EntropySearchWorker`] and its factory
//! - `projection`: [`DisplayProjector`]

pub mod entropy;
pub mod error;
pub mod formats;
pub mod library;
pub mod projection;
pub mod spectrum;
pub mod worker;

pub use error::SearchError;
pub use projection::DisplayProjector;
pub use worker::{EntropySearchWorker, EntropyWorkerFactory};
