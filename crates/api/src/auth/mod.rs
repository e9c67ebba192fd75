//! Bearer-key authentication across the four Aura key scopes.
//!
//! The verification contract: a presented key carrying the admin prefix is
//! checked against the stored admin hash regardless of the scope an endpoint
//! expects (admin overrides all scopes); a key carrying the expected scope's
//! prefix is checked against that scope's stored hash; anything else is
//! unauthorised. Hash verification is Argon2id, which is constant-time with
//! respect to the key value.

use aura_core::keys::{self, KeyScope};
use axum::http::{header, HeaderMap};

use aura_db::repositories::AdminRepo;
use aura_db::DbPool;

use crate::error::{AppError, AppResult};

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))?;
    Ok(value.strip_prefix("Bearer ").unwrap_or(value))
}

/// Check a presented key against the stored admin hash.
async fn check_admin(pool: &DbPool, presented: &str) -> AppResult<bool> {
    let Some(admin) = AdminRepo::load(pool).await? else {
        return Ok(false);
    };
    Ok(keys::verify_key(&admin.key_hash, presented)?)
}

/// Apply the verification contract for one endpoint scope.
///
/// `stored_hash` is the hash the scope authenticates against (a project's,
/// runner's, or job's); `None` means the scope has no credential right now
/// (e.g. a job that is not started).
pub async fn check_scoped(
    pool: &DbPool,
    scope: KeyScope,
    stored_hash: Option<&str>,
    presented: &str,
) -> AppResult<bool> {
    match keys::scope_of(presented) {
        Some(KeyScope::Admin) => check_admin(pool, presented).await,
        Some(claimed) if claimed == scope => match stored_hash {
            Some(hash) => Ok(keys::verify_key(hash, presented)?),
            None => Ok(false),
        },
        _ => Ok(false),
    }
}

/// Like [`check_scoped`] but turns a failed check into `Unauthorized`.
pub async fn authorize(
    pool: &DbPool,
    scope: KeyScope,
    stored_hash: Option<&str>,
    presented: &str,
) -> AppResult<()> {
    if check_scoped(pool, scope, stored_hash, presented).await? {
        Ok(())
    } else {
        Err(AppError::Unauthorized("unauthorized".into()))
    }
}
