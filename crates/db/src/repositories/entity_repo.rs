use aura_core::types::{DbId, UnixTime};

use crate::models::entity::Entity;
use crate::DbPool;

const COLUMNS: &str = "id, project_id, key, val, created_at";

/// Lookup and creation of entities. Entities are immutable after creation.
pub struct EntityRepo;

impl EntityRepo {
    pub async fn find(
        pool: &DbPool,
        project_id: DbId,
        key: &str,
        val: &str,
    ) -> Result<Option<Entity>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM entities WHERE project_id = ? AND key = ? AND val = ?");
        sqlx::query_as::<_, Entity>(&query)
            .bind(project_id)
            .bind(key)
            .bind(val)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Entity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM entities WHERE id = ?");
        sqlx::query_as::<_, Entity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an entity if the `(project_id, key, val)` triple is new.
    /// Losing a creation race is fine; callers re-find afterwards.
    pub async fn create(
        pool: &DbPool,
        project_id: DbId,
        key: &str,
        val: &str,
        created_at: UnixTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO entities (project_id, key, val, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(project_id)
        .bind(key)
        .bind(val)
        .bind(created_at)
        .execute(pool)
        .await?;
        Ok(())
    }
}
