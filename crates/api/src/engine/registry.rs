use std::collections::HashMap;

use entropy_core::error::CoreError;
use entropy_core::job::{Job, JobId};
use tokio::sync::RwLock;

/// In-memory table of every job submitted since startup.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` and shared between
/// request handlers and job executors. Jobs are never evicted.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job. Fails with [`CoreError::Conflict`] if the id is taken.
    pub async fn create(&self, job: Job) -> Result<(), CoreError> {
        let mut jobs = self.jobs.write().await;
        let id = job.id();
        if jobs.contains_key(&id) {
            return Err(CoreError::Conflict(format!("Job {id} already exists")));
        }
        jobs.insert(id, job);
        Ok(())
    }

    /// Snapshot of a job's current record.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Apply `f` to the stored job while holding the write lock.
    ///
    /// Readers never observe a partially applied update.
    pub async fn update<R>(
        &self,
        id: &JobId,
        f: impl FnOnce(&mut Job) -> R,
    ) -> Result<R, CoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id).ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            id: id.to_string(),
        })?;
        Ok(f(job))
    }

    /// Number of jobs currently tracked.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
