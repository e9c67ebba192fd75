use aura_core::types::DbId;
use sqlx::FromRow;

/// A registered worker process. Runners poll the controller for jobs; the
/// key hash secures that channel.
#[derive(Debug, Clone, FromRow)]
pub struct Runner {
    pub id: DbId,
    pub name: String,
    pub key_hash: String,
}
