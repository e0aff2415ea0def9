//! Per-job execution task.
//!
//! A [`JobExecutor`] owns one submitted job. It runs on its own Tokio task,
//! pushes the worker's two blocking phases onto the blocking pool, and
//! records every step in the [`JobRegistry`] so pollers can follow along.

use std::any::Any;
use std::sync::Arc;

use entropy_core::error::CoreError;
use entropy_core::job::{Job, JobId, MSG_COMPLETE, MSG_INITIALIZING};
use entropy_core::search::{SearchInputs, SearchReport, WorkerError, WorkerFactory};
use tokio::task::JoinHandle;

use super::registry::JobRegistry;

/// Why a job's workload did not produce a report.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("Search worker panicked: {0}")]
    Panicked(String),
}

/// Drives a single job from `queued` to `finished` or `error`.
pub struct JobExecutor {
    id: JobId,
    inputs: SearchInputs,
    registry: Arc<JobRegistry>,
    workers: Arc<dyn WorkerFactory>,
}

impl JobExecutor {
    pub fn new(
        id: JobId,
        inputs: SearchInputs,
        registry: Arc<JobRegistry>,
        workers: Arc<dyn WorkerFactory>,
    ) -> Self {
        Self {
            id,
            inputs,
            registry,
            workers,
        }
    }

    /// Start the job on its own task and return immediately.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the job to completion. Never panics on workload failure.
    pub async fn run(self) {
        if !self.transition(|job| job.start(MSG_INITIALIZING)).await {
            return;
        }
        tracing::info!(job_id = %self.id, "Search job started");

        match self.execute().await {
            Ok(report) => {
                let queries = report.spectra.len();
                let report = Arc::new(report);
                if self
                    .transition(|job| job.finish(report, MSG_COMPLETE))
                    .await
                {
                    tracing::info!(job_id = %self.id, queries, "Search job finished");
                }
            }
            Err(e) => {
                tracing::error!(job_id = %self.id, error = %e, "Search job failed");
                let message = format!("An error occurred: {e}");
                self.transition(|job| job.fail(message)).await;
            }
        }
    }

    /// Load the reference library, then search the query file.
    async fn execute(&self) -> Result<SearchReport, ExecutionError> {
        let reference = self.inputs.reference_path.clone();
        self.progress(format!(
            "Loading reference library: {}",
            reference.display()
        ))
        .await;

        let workers = Arc::clone(&self.workers);
        let params = self.inputs.params;
        let worker = run_blocking(move || {
            let mut worker = workers.create(&params);
            worker.load_reference(&reference)?;
            Ok(worker)
        })
        .await?;

        let query = self.inputs.query_path.clone();
        self.progress(format!("Searching query file: {}", query.display()))
            .await;

        run_blocking(move || {
            let mut worker = worker;
            worker.search(&query, &params)
        })
        .await
    }

    async fn progress(&self, message: String) {
        tracing::debug!(job_id = %self.id, %message, "Search job progress");
        self.transition(|job| job.report_progress(message)).await;
    }

    /// Apply a state change. Returns whether it was accepted.
    async fn transition(&self, f: impl FnOnce(&mut Job) -> Result<(), CoreError>) -> bool {
        match self.registry.update(&self.id, f).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) | Err(e) => {
                tracing::warn!(job_id = %self.id, error = %e, "Job transition rejected");
                false
            }
        }
    }
}

/// Run a workload phase on the blocking pool, turning a panic into an error.
async fn run_blocking<T, F>(f: F) -> Result<T, ExecutionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WorkerError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ExecutionError::from),
        Err(e) if e.is_panic() => Err(ExecutionError::Panicked(panic_message(e.into_panic()))),
        Err(e) => Err(ExecutionError::Panicked(e.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
