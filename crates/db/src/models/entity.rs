use aura_core::types::{DbId, UnixTime};
use sqlx::FromRow;

/// Groups jobs that describe the same logical subject (a commit, a release,
/// a nightly date, ...). Identified by `(project_id, key, val)`; immutable
/// after creation.
#[derive(Debug, Clone, FromRow)]
pub struct Entity {
    pub id: DbId,
    pub project_id: DbId,
    pub key: String,
    pub val: String,
    pub created_at: UnixTime,
}
