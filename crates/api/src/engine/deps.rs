//! Dependency graph maintenance.
//!
//! The `preceding_jobs` relation gates dispatch: a job with any remaining
//! link is invisible to runners. Links are inserted during submission
//! post-processing and deleted as their older side reaches a terminal state.

use std::collections::HashSet;

use aura_core::status::JobStatus;
use aura_core::types::{DbId, UnixTime};
use aura_db::repositories::{JobRepo, PrecedingRepo};
use aura_db::DbPool;

/// Wire up the requested preceding jobs for a freshly submitted job.
///
/// Ids that do not resolve to a job are skipped; the generic submit endpoint
/// has already rejected them synchronously, integration endpoints skip them
/// by design.
pub async fn link_preceding_jobs(
    pool: &DbPool,
    preceding: &[DbId],
    job_id: DbId,
    now: UnixTime,
) -> Result<(), sqlx::Error> {
    for &older in preceding {
        if JobRepo::find_by_id(pool, older).await?.is_none() {
            continue;
        }
        PrecedingRepo::insert(pool, older, job_id).await?;

        // Re-load AFTER inserting the link. If the older job reached a
        // terminal state between the existence check and the insert, only
        // this second read observes it; checking the status once before the
        // insert would leave the new link dangling forever.
        let Some(older_job) = JobRepo::find_by_id(pool, older).await? else {
            continue;
        };
        match older_job.status() {
            Some(JobStatus::Succeeded) => {
                PrecedingRepo::delete_for_older(pool, older).await?;
            }
            Some(JobStatus::Cancelled) | Some(JobStatus::Failed) => {
                PrecedingRepo::delete_for_older(pool, older).await?;
                JobRepo::mark_done(pool, job_id, JobStatus::Cancelled, 0, now).await?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Propagate a job's terminal outcome through the dependency graph.
///
/// Failure and cancellation cascade: every transitive successor is
/// cancelled. Each node's children are marked terminal before the walk
/// descends into them, and a node's links are deleted only after its
/// children are marked, so a successor can never become dispatchable in the
/// window between those writes. The visited set keeps the walk finite even
/// over malformed (cyclic) link data; `mark_done` refusing terminal rows
/// makes repeated cancellation a no-op.
pub async fn propagate_completion(
    pool: &DbPool,
    job_id: DbId,
    status: JobStatus,
    now: UnixTime,
) -> Result<(), sqlx::Error> {
    if !matches!(status, JobStatus::Failed | JobStatus::Cancelled) {
        PrecedingRepo::delete_for_older(pool, job_id).await?;
        return Ok(());
    }

    let mut worklist = vec![job_id];
    let mut visited = HashSet::from([job_id]);
    while let Some(current) = worklist.pop() {
        for successor in PrecedingRepo::succeeding_ids(pool, current).await? {
            if !visited.insert(successor) {
                continue;
            }
            let cancelled =
                JobRepo::mark_done(pool, successor, JobStatus::Cancelled, 0, now).await?;
            if cancelled {
                tracing::info!(
                    job_id = successor,
                    parent = current,
                    "Job cancelled by failed or cancelled dependency",
                );
            }
            worklist.push(successor);
        }
        PrecedingRepo::delete_for_older(pool, current).await?;
    }
    Ok(())
}
