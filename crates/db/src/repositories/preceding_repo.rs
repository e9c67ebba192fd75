use aura_core::types::DbId;

use crate::DbPool;

/// The preceding-job relation: `(older, newer)` rows persist "newer must
/// wait for older". Deleting the rows with a given older side is the sole
/// mechanism that makes successor jobs visible to the dispatcher.
pub struct PrecedingRepo;

impl PrecedingRepo {
    pub async fn insert(pool: &DbPool, older: DbId, newer: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO preceding_jobs (older_job_id, newer_job_id) VALUES (?, ?)")
            .bind(older)
            .bind(newer)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Release every successor of `older` by dropping its links.
    pub async fn delete_for_older(pool: &DbPool, older: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM preceding_jobs WHERE older_job_id = ?")
            .bind(older)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Ids of jobs that wait on `older`.
    pub async fn succeeding_ids(pool: &DbPool, older: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT newer_job_id FROM preceding_jobs WHERE older_job_id = ?")
            .bind(older)
            .fetch_all(pool)
            .await
    }
}
