//! Job-scoped storage for uploaded spectrum files.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use entropy_core::job::JobId;

/// Fallback name when a client file name sanitizes to nothing.
const FALLBACK_FILE_NAME: &str = "upload";

/// Writes uploads under `{root}/{job_id}/`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_dir(&self, id: &JobId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Persist one uploaded file as `{role}_{sanitized name}` in the job's
    /// directory and return its path.
    pub async fn save_upload(
        &self,
        id: &JobId,
        role: &str,
        file_name: &str,
        data: &[u8],
    ) -> io::Result<PathBuf> {
        let dir = self.job_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        let dest = dir.join(format!("{role}_{}", sanitize_file_name(file_name)));
        tokio::fs::write(&dest, data).await?;
        tracing::debug!(job_id = %id, path = %dest.display(), bytes = data.len(), "Upload saved");
        Ok(dest)
    }

    /// Remove a job's directory. Missing directories are not an error.
    ///
    /// Synchronous so it can run from `Drop`; a job directory holds two files.
    pub fn remove_job_dir(&self, id: &JobId) -> io::Result<()> {
        match std::fs::remove_dir_all(self.job_dir(id)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Removes a job's upload directory when dropped, unless [`keep`] was called.
///
/// Covers every way a submission can end before its job exists: an error
/// return, or the request future being dropped by the timeout layer.
///
/// [`keep`]: UploadGuard::keep
#[derive(Debug)]
pub struct UploadGuard {
    store: Arc<UploadStore>,
    id: JobId,
    armed: bool,
}

impl UploadGuard {
    pub fn new(store: Arc<UploadStore>, id: JobId) -> Self {
        Self {
            store,
            id,
            armed: true,
        }
    }

    /// The job now owns the uploads; leave them in place.
    pub fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.store.remove_job_dir(&self.id) {
            Ok(()) => tracing::debug!(job_id = %self.id, "Discarded abandoned uploads"),
            Err(e) => tracing::warn!(job_id = %self.id, error = %e, "Failed to remove uploads"),
        }
    }
}

/// Reduce a client-supplied file name to a safe basename.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so the result is never hidden or `..`.
pub fn sanitize_file_name(name: &str) -> String {
    let basename = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
