//! Repository for the `jobs` table.
//!
//! Every status transition is a conditional `UPDATE` guarded on the current
//! status. A transition that affects zero rows reports that to the caller
//! (`false` / `None`); this is the sole synchronisation point for the
//! reservation race and for cascade-cancel idempotency.

use aura_core::status::{JobStatus, StatusId};
use aura_core::types::{DbId, UnixTime};

use crate::models::job::{Job, NewJob};
use crate::DbPool;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, entity_id, name, status_id, created_at, earliest_start_at, \
    started_at, ended_at, key_hash, cmd, env, tag, runner_id, exit_code";

/// Terminal statuses: cancelled, succeeded, failed.
const TERMINAL_STATUSES: [StatusId; 3] = [
    JobStatus::Cancelled as StatusId,
    JobStatus::Succeeded as StatusId,
    JobStatus::Failed as StatusId,
];

/// CRUD and lifecycle transitions for jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new job in Submitted status. Duplicate submissions (same
    /// entity, same name) intentionally create distinct rows.
    pub async fn create(pool: &DbPool, input: &NewJob<'_>) -> Result<DbId, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO jobs \
                 (entity_id, name, status_id, created_at, earliest_start_at, \
                  cmd, env, tag, exit_code) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(input.entity_id)
        .bind(input.name)
        .bind(JobStatus::Submitted.id())
        .bind(input.created_at)
        .bind(input.earliest_start_at)
        .bind(input.cmd)
        .bind(input.env)
        .bind(input.tag)
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = ?");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transition Submitted -> Created after dependency resolution.
    ///
    /// Returns `false` when the job is not currently Submitted, which is
    /// the expected outcome when a cascade has already cancelled it.
    pub async fn mark_created(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE jobs SET status_id = ? WHERE id = ? AND status_id = ?")
            .bind(JobStatus::Created.id())
            .bind(id)
            .bind(JobStatus::Submitted.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Atomically reserve a Created job for a runner: Created -> Started,
    /// recording `started_at`, the fresh job-key hash, and the runner.
    ///
    /// Returns `None` when another check-in won the race.
    pub async fn reserve(
        pool: &DbPool,
        id: DbId,
        key_hash: &str,
        runner_id: DbId,
        now: UnixTime,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = ?, started_at = ?, key_hash = ?, runner_id = ? \
             WHERE id = ? AND status_id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Started.id())
            .bind(now)
            .bind(key_hash)
            .bind(runner_id)
            .bind(id)
            .bind(JobStatus::Created.id())
            .fetch_optional(pool)
            .await
    }

    /// Move a job to a terminal status, recording `ended_at` and the exit
    /// code and clearing the job key. `runner_id` is kept for provenance.
    ///
    /// Callable from any non-terminal status (cascade cancellation reaches
    /// jobs that were never started). Returns `false` when the job is
    /// already terminal, which makes repeated cancellation a no-op.
    pub async fn mark_done(
        pool: &DbPool,
        id: DbId,
        status: JobStatus,
        exit_code: i64,
        now: UnixTime,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = ?, ended_at = ?, key_hash = NULL, exit_code = ? \
             WHERE id = ? AND status_id NOT IN (?, ?, ?)",
        )
        .bind(status.id())
        .bind(now)
        .bind(exit_code)
        .bind(id)
        .bind(TERMINAL_STATUSES[0])
        .bind(TERMINAL_STATUSES[1])
        .bind(TERMINAL_STATUSES[2])
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Ids of jobs a runner may claim for `tag`: Created, past their
    /// earliest start, and with no remaining preceding link. Oldest first.
    pub async fn find_dispatchable(
        pool: &DbPool,
        tag: &str,
        limit: i64,
        now: UnixTime,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT jobs.id FROM jobs \
             LEFT JOIN preceding_jobs ON jobs.id = preceding_jobs.newer_job_id \
             WHERE preceding_jobs.newer_job_id IS NULL \
               AND jobs.tag = ? \
               AND jobs.status_id = ? \
               AND jobs.earliest_start_at <= ? \
             ORDER BY jobs.created_at ASC \
             LIMIT ?",
        )
        .bind(tag)
        .bind(JobStatus::Created.id())
        .bind(now)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// All jobs attached to an entity, oldest first. Feeds the status
    /// rollup pushed to integrations.
    pub async fn list_for_entity(pool: &DbPool, entity_id: DbId) -> Result<Vec<Job>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM jobs WHERE entity_id = ? ORDER BY created_at ASC");
        sqlx::query_as::<_, Job>(&query)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
