//! Runner check-in dispatch: candidate selection and exactly-once
//! reservation.

use aura_core::keys::{self, KeyScope};
use aura_core::types::{DbId, UnixTime};
use aura_db::models::job::Job;
use aura_db::repositories::JobRepo;
use aura_db::DbPool;

use crate::error::AppResult;

/// A job reserved for a runner, paired with the single-use plaintext key
/// minted for it. The plaintext exists only until the check-in response is
/// written.
pub struct ReservedJob {
    pub job: Job,
    pub job_key: String,
}

/// Reserve up to `limit` dispatchable jobs for a runner.
///
/// Candidates are collected per tag in the runner's priority order, each
/// query bounded by what is left of `limit`. Every candidate is then raced
/// through the store's conditional Created -> Started update; a lost race
/// means another check-in got there first and the candidate is skipped
/// silently.
pub async fn reserve_for_runner(
    pool: &DbPool,
    runner_id: DbId,
    tags: &[String],
    limit: i64,
    now: UnixTime,
) -> AppResult<Vec<ReservedJob>> {
    let mut candidates = Vec::new();
    for tag in tags {
        let remaining = limit - candidates.len() as i64;
        if remaining <= 0 {
            break;
        }
        candidates.extend(JobRepo::find_dispatchable(pool, tag, remaining, now).await?);
    }

    let mut reserved = Vec::new();
    for candidate in candidates {
        if reserved.len() as i64 >= limit {
            break;
        }
        let minted = keys::mint(KeyScope::Job)?;
        match JobRepo::reserve(pool, candidate, &minted.hash, runner_id, now).await? {
            Some(job) => {
                tracing::info!(job_id = job.id, runner_id, tag = %job.tag, "Job reserved");
                reserved.push(ReservedJob {
                    job,
                    job_key: minted.plaintext,
                });
            }
            // Another runner won the reservation race.
            None => continue,
        }
    }
    Ok(reserved)
}
