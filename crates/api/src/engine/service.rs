use std::sync::Arc;

use entropy_core::error::CoreError;
use entropy_core::job::{Job, JobId, JobStatus};
use entropy_core::search::{ResultProjector, SearchInputs, WorkerFactory};
use entropy_core::types::Timestamp;
use serde::Serialize;

use super::executor::JobExecutor;
use super::registry::JobRegistry;

/// Status reported for ids that were never issued.
pub const STATUS_NOT_FOUND: &str = "not_found";

/// Message reported for ids that were never issued.
pub const MSG_NOT_FOUND: &str = "Job ID not found.";

/// Poll response for `GET /api/status/{id}`.
///
/// Timestamps are omitted for unknown ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl StatusView {
    fn not_found() -> Self {
        Self {
            status: STATUS_NOT_FOUND,
            message: MSG_NOT_FOUND.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn of(job: &Job) -> Self {
        Self {
            status: job.status().as_str(),
            message: job.status_message().to_string(),
            created_at: Some(job.created_at()),
            updated_at: Some(job.updated_at()),
        }
    }
}

/// Entry point for submitting search jobs and querying their progress.
///
/// Cheaply cloneable; every clone shares the same registry.
#[derive(Clone)]
pub struct JobService {
    registry: Arc<JobRegistry>,
    workers: Arc<dyn WorkerFactory>,
    projector: Arc<dyn ResultProjector>,
}

impl JobService {
    pub fn new(
        registry: Arc<JobRegistry>,
        workers: Arc<dyn WorkerFactory>,
        projector: Arc<dyn ResultProjector>,
    ) -> Self {
        Self {
            registry,
            workers,
            projector,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Submit a job under a freshly generated id.
    pub async fn submit(&self, inputs: SearchInputs) -> Result<JobId, CoreError> {
        self.submit_as(JobId::new(), inputs).await
    }

    /// Submit a job under a caller-chosen id.
    ///
    /// Validates the parameters, records the job as `queued` and spawns its
    /// executor. Returns without waiting for any part of the search.
    pub async fn submit_as(&self, id: JobId, inputs: SearchInputs) -> Result<JobId, CoreError> {
        inputs.params.validate()?;
        self.registry.create(Job::new(id)).await?;

        tracing::info!(
            job_id = %id,
            query = %inputs.query_path.display(),
            reference = %inputs.reference_path.display(),
            "Search job submitted",
        );

        JobExecutor::new(
            id,
            inputs,
            Arc::clone(&self.registry),
            Arc::clone(&self.workers),
        )
        .spawn();

        Ok(id)
    }

    /// Current status and message. Unknown ids are reported, not rejected.
    pub async fn get_status(&self, id: &str) -> StatusView {
        match self.job(id).await {
            Some(job) => StatusView::of(&job),
            None => StatusView::not_found(),
        }
    }

    /// Display projection of a finished job's report.
    pub async fn get_results(&self, id: &str) -> Result<serde_json::Value, CoreError> {
        let not_ready = || CoreError::NotReady { id: id.to_string() };
        let job = self.job(id).await.ok_or_else(not_ready)?;
        match job.result() {
            Some(report) if job.status() == JobStatus::Finished => {
                Ok(self.projector.project(report))
            }
            _ => Err(not_ready()),
        }
    }

    /// Look up a job by its textual id. Unparseable ids are simply unknown.
    pub async fn job(&self, id: &str) -> Option<Job> {
        let id: JobId = id.parse().ok()?;
        self.registry.get(&id).await
    }
}
