//! Domain types shared by the search worker and the API server.
//!
//! Has no internal workspace dependencies.

pub mod error;
pub mod job;
pub mod search;
pub mod types;
