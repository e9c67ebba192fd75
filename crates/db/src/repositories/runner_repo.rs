use aura_core::types::DbId;

use crate::models::runner::Runner;
use crate::DbPool;

const COLUMNS: &str = "id, name, key_hash";

/// CRUD for runners. Runners are registered by the operator.
pub struct RunnerRepo;

impl RunnerRepo {
    pub async fn find_by_name(pool: &DbPool, name: &str) -> Result<Option<Runner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM runners WHERE name = ?");
        sqlx::query_as::<_, Runner>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Runner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM runners WHERE id = ?");
        sqlx::query_as::<_, Runner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &DbPool, name: &str, key_hash: &str) -> Result<DbId, sqlx::Error> {
        let result = sqlx::query("INSERT INTO runners (name, key_hash) VALUES (?, ?)")
            .bind(name)
            .bind(key_hash)
            .execute(pool)
            .await?;
        Ok(result.last_insert_rowid())
    }
}
