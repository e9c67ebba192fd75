use aura_core::types::DbId;
use sqlx::FromRow;

/// The operator credential row. Exactly one exists after first boot; the
/// matching plaintext key is printed once when it is minted.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: DbId,
    pub key_hash: String,
}
