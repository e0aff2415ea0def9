//! Background search job engine.
//!
//! - [`registry`]: shared in-memory job table
//! - [`executor`]: runs one job from `queued` to a terminal state
//! - [`service`]: submission, status and result queries used by handlers

pub mod executor;
pub mod registry;
pub mod service;

pub use registry::JobRegistry;
pub use service::{JobService, StatusView};
