//! HTTP front end and job engine for spectral entropy search.
//!
//! Users upload a query file and a reference library; each submission
//! becomes a background job whose progress is polled until the results
//! page can be rendered.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
