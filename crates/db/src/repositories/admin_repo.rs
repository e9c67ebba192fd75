use aura_core::types::DbId;

use crate::models::admin::Admin;
use crate::DbPool;

/// Access to the singleton admin credential.
pub struct AdminRepo;

impl AdminRepo {
    /// Load the admin row; `None` before first initialisation.
    pub async fn load(pool: &DbPool) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>("SELECT id, key_hash FROM admins LIMIT 1")
            .fetch_optional(pool)
            .await
    }

    /// Store the admin key hash at first initialisation.
    pub async fn create(pool: &DbPool, key_hash: &str) -> Result<DbId, sqlx::Error> {
        let result = sqlx::query("INSERT INTO admins (key_hash) VALUES (?)")
            .bind(key_hash)
            .execute(pool)
            .await?;
        Ok(result.last_insert_rowid())
    }
}
