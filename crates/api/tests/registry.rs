//! Integration tests for the in-memory job registry.

use std::sync::Arc;

use assert_matches::assert_matches;
use entropy_api::engine::JobRegistry;
use entropy_core::error::CoreError;
use entropy_core::job::{Job, JobId, JobStatus, MSG_WAITING};

// ---------------------------------------------------------------------------
// Test: create then get returns a queued snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_job_is_visible_as_queued() {
    let registry = JobRegistry::new();
    let id = JobId::new();
    registry.create(Job::new(id)).await.unwrap();

    let job = registry.get(&id).await.expect("job must exist");
    assert_eq!(job.id(), id);
    assert_eq!(job.status(), JobStatus::Queued);
    assert_eq!(job.status_message(), MSG_WAITING);
    assert!(job.result().is_none());
}

// ---------------------------------------------------------------------------
// Test: duplicate ids are rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_create_is_a_conflict() {
    let registry = JobRegistry::new();
    let id = JobId::new();
    registry.create(Job::new(id)).await.unwrap();

    let err = registry.create(Job::new(id)).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(registry.len().await, 1);
}

// ---------------------------------------------------------------------------
// Test: lookups and updates on unknown ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let registry = JobRegistry::new();
    let id = JobId::new();

    assert!(registry.get(&id).await.is_none());
    let err = registry.update(&id, |_| ()).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Job", .. });
    assert!(registry.is_empty().await);
}

// ---------------------------------------------------------------------------
// Test: snapshots are detached from later updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshots_do_not_change_after_update() {
    let registry = JobRegistry::new();
    let id = JobId::new();
    registry.create(Job::new(id)).await.unwrap();

    let before = registry.get(&id).await.unwrap();
    registry
        .update(&id, |job| job.start("Initializing search worker..."))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(before.status(), JobStatus::Queued);
    assert_eq!(registry.get(&id).await.unwrap().status(), JobStatus::Running);
}

// ---------------------------------------------------------------------------
// Test: rejected transitions leave the stored job untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_transition_is_reported_through_update() {
    let registry = JobRegistry::new();
    let id = JobId::new();
    registry.create(Job::new(id)).await.unwrap();

    let outcome = registry
        .update(&id, |job| job.report_progress("too early"))
        .await
        .unwrap();
    assert_matches!(outcome, Err(CoreError::InvalidTransition { .. }));

    let job = registry.get(&id).await.unwrap();
    assert_eq!(job.status(), JobStatus::Queued);
    assert_eq!(job.status_message(), MSG_WAITING);
}

// ---------------------------------------------------------------------------
// Test: concurrent writers on distinct ids do not interfere
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_on_distinct_ids() {
    let registry = Arc::new(JobRegistry::new());
    let ids: Vec<JobId> = (0..32).map(|_| JobId::new()).collect();

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry.create(Job::new(id)).await.unwrap();
                registry
                    .update(&id, |job| job.start(format!("started {id}")))
                    .await
                    .unwrap()
                    .unwrap();
                registry
                    .update(&id, |job| job.fail(format!("failed {id}")))
                    .await
                    .unwrap()
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.len().await, ids.len());
    for id in &ids {
        let job = registry.get(id).await.unwrap();
        assert_eq!(job.status(), JobStatus::Error);
        assert_eq!(job.status_message(), format!("failed {id}"));
    }
}
