//! Request handlers for the search workflow.
//!
//! Handlers parse HTTP input, delegate to [`JobService`](crate::engine::JobService)
//! and map failures via [`AppError`](crate::error::AppError).

pub mod results;
pub mod search;
pub mod status;
