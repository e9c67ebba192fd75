use aura_core::types::{DbId, UnixTime};
use sqlx::FromRow;

/// A named set of entities within a project. Same shape as an entity but a
/// separate namespace; used for grouping views only and never consulted by
/// dispatch.
#[derive(Debug, Clone, FromRow)]
pub struct Collection {
    pub id: DbId,
    pub project_id: DbId,
    pub key: String,
    pub val: String,
    pub created_at: UnixTime,
}
