use aura_core::types::DbId;
use sqlx::FromRow;

/// Namespace for entities and jobs, with its own API credential.
/// Created by the operator, never deleted by the controller.
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub key_hash: String,
}
