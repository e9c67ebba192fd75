//! Key minting, hashing, and verification for the four Aura key scopes.
//!
//! Every key is `PREFIX` followed by 42 characters of URL-safe unpadded
//! base64 over 32 random bytes. Only the Argon2id PHC hash is stored; the
//! plaintext is returned exactly once at mint time.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

use crate::error::CoreError;

/// Random bytes backing each minted key.
const KEY_MATERIAL_LEN: usize = 32;

/// Length of the base64 portion after the scope prefix.
const KEY_SUFFIX_LEN: usize = 42;

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// The four credential scopes. The admin key is accepted wherever any other
/// scope is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    Admin,
    Project,
    Runner,
    Job,
}

impl KeyScope {
    /// ASCII prefix embedded in the key string.
    pub fn prefix(self) -> &'static str {
        match self {
            KeyScope::Admin => "AURA_ADMINKEY_",
            KeyScope::Project => "AURA_PROJECTKEY_",
            KeyScope::Runner => "AURA_RUNNERKEY_",
            KeyScope::Job => "AURA_JOBKEY_",
        }
    }
}

/// Determine which scope a presented key claims, by prefix. Keys are
/// case-sensitive; anything without a known prefix has no scope.
pub fn scope_of(presented: &str) -> Option<KeyScope> {
    [
        KeyScope::Admin,
        KeyScope::Project,
        KeyScope::Runner,
        KeyScope::Job,
    ]
    .into_iter()
    .find(|scope| presented.starts_with(scope.prefix()))
}

// ---------------------------------------------------------------------------
// Minting
// ---------------------------------------------------------------------------

/// The result of minting a new key.
pub struct MintedKey {
    /// Shown to the caller exactly once, never stored.
    pub plaintext: String,
    /// Argon2id PHC string, stored in the database.
    pub hash: String,
}

/// Mint a fresh key for the given scope.
pub fn mint(scope: KeyScope) -> Result<MintedKey, CoreError> {
    let mut bytes = [0u8; KEY_MATERIAL_LEN];
    rand::rng().fill_bytes(&mut bytes);

    let mut encoded = URL_SAFE_NO_PAD.encode(bytes);
    encoded.truncate(KEY_SUFFIX_LEN);

    let plaintext = format!("{}{}", scope.prefix(), encoded);
    let hash = hash_key(&plaintext)?;
    Ok(MintedKey { plaintext, hash })
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Hash a plaintext key using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (algorithm, params, salt, digest).
pub fn hash_key(key: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(key.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("key hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a presented key against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only for malformed stored hashes.
pub fn verify_key(stored_hash: &str, presented: &str) -> Result<bool, CoreError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CoreError::Internal(format!("stored key hash is malformed: {e}")))?;
    match Argon2::default().verify_password(presented.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(format!("key verification failed: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
