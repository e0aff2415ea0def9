//! Job identity, lifecycle states, and the in-memory job record.
//!
//! A job moves `queued -> running -> finished | error`. The finished state
//! carries the search report, so a job has a result exactly when it is
//! finished. Every transition overwrites the status message, which is never
//! empty.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::search::SearchReport;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

/// Message of a freshly submitted job.
pub const MSG_WAITING: &str = "Waiting to start...";

/// Message set when the executor picks the job up.
pub const MSG_INITIALIZING: &str = "Initializing search worker...";

/// Message set when the search finished successfully.
pub const MSG_COMPLETE: &str = "Search complete!";

/// Fallback message for a running job when the caller supplied none.
pub const MSG_RUNNING: &str = "Running...";

/// Fallback message for a failed job when the caller supplied none.
pub const MSG_FAILED: &str = "An unknown error occurred.";

// ---------------------------------------------------------------------------
// JobId
// ---------------------------------------------------------------------------

/// Opaque unique job identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Externally visible lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
            JobStatus::Error => "error",
        }
    }

    /// Position in the lifecycle. Observed ranks of one job never decrease.
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Running => 1,
            JobStatus::Finished | JobStatus::Error => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Lifecycle state of a job. Only the finished state holds a result.
#[derive(Debug, Clone)]
pub enum JobState {
    Queued,
    Running,
    Finished(Arc<SearchReport>),
    Error,
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Running => JobStatus::Running,
            JobState::Finished(_) => JobStatus::Finished,
            JobState::Error => JobStatus::Error,
        }
    }
}

/// One tracked search job.
///
/// Cloning is cheap: the result is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    state: JobState,
    status_message: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Job {
    /// Create a job in the `queued` state.
    pub fn new(id: JobId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            state: JobState::Queued,
            status_message: MSG_WAITING.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// The search report, present only once the job is finished.
    pub fn result(&self) -> Option<&Arc<SearchReport>> {
        match &self.state {
            JobState::Finished(report) => Some(report),
            _ => None,
        }
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// `queued -> running`.
    pub fn start(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        self.require(JobStatus::Queued, JobStatus::Running)?;
        self.apply(JobState::Running, message.into(), MSG_RUNNING);
        Ok(())
    }

    /// `running -> running` with a new progress message.
    pub fn report_progress(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        self.require(JobStatus::Running, JobStatus::Running)?;
        self.apply(JobState::Running, message.into(), MSG_RUNNING);
        Ok(())
    }

    /// `running -> finished`, attaching the result in the same step.
    pub fn finish(
        &mut self,
        result: Arc<SearchReport>,
        message: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.require(JobStatus::Running, JobStatus::Finished)?;
        self.apply(JobState::Finished(result), message.into(), MSG_COMPLETE);
        Ok(())
    }

    /// `running -> error`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        self.require(JobStatus::Running, JobStatus::Error)?;
        self.apply(JobState::Error, message.into(), MSG_FAILED);
        Ok(())
    }

    fn require(&self, expected: JobStatus, to: JobStatus) -> Result<(), CoreError> {
        let from = self.status();
        if from == expected {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { from, to })
        }
    }

    fn apply(&mut self, state: JobState, message: String, fallback: &str) {
        self.state = state;
        self.status_message = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        self.updated_at = chrono::Utc::now();
    }
}
