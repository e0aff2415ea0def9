use std::sync::Arc;

use crate::engine::JobService;
use crate::storage::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Job submission and polling.
    pub jobs: JobService,
    /// Job-scoped storage for uploaded spectrum files.
    pub uploads: Arc<UploadStore>,
}
