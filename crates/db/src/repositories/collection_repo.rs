use aura_core::types::{DbId, UnixTime};

use crate::models::collection::Collection;
use crate::DbPool;

const COLUMNS: &str = "id, project_id, key, val, created_at";

/// Lookup, creation, and membership management for collections.
pub struct CollectionRepo;

impl CollectionRepo {
    pub async fn find(
        pool: &DbPool,
        project_id: DbId,
        key: &str,
        val: &str,
    ) -> Result<Option<Collection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM collections WHERE project_id = ? AND key = ? AND val = ?"
        );
        sqlx::query_as::<_, Collection>(&query)
            .bind(project_id)
            .bind(key)
            .bind(val)
            .fetch_optional(pool)
            .await
    }

    /// Insert a collection if the `(project_id, key, val)` triple is new.
    /// Losing a creation race is fine; callers re-find afterwards.
    pub async fn create(
        pool: &DbPool,
        project_id: DbId,
        key: &str,
        val: &str,
        created_at: UnixTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO collections (project_id, key, val, created_at) \
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

    /// Add an entity to a collection. Membership is a set, so repeating the
    /// insert is a no-op.
    pub async fn insert_entity(
        pool: &DbPool,
        collection_id: DbId,
        entity_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO collections_entities (collection_id, entity_id) VALUES (?, ?)",
        )
        .bind(collection_id)
        .bind(entity_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
