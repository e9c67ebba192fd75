use aura_core::types::DbId;

use crate::models::project::Project;
use crate::DbPool;

const COLUMNS: &str = "id, name, slug, key_hash";

/// CRUD for projects. Projects are created by the operator and never
/// deleted by the controller.
pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn find_by_slug(pool: &DbPool, slug: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE slug = ?");
        sqlx::query_as::<_, Project>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = ?");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &DbPool,
        name: &str,
        slug: &str,
        key_hash: &str,
    ) -> Result<DbId, sqlx::Error> {
        let result = sqlx::query("INSERT INTO projects (name, slug, key_hash) VALUES (?, ?, ?)")
            .bind(name)
            .bind(slug)
            .bind(key_hash)
            .execute(pool)
            .await?;
        Ok(result.last_insert_rowid())
    }
}
