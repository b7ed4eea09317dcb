//! Credential hashing. Raw passwords only pass through these two functions
//! and are never logged or stored; only the PHC string leaves this module.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

fn hash_failure(stage: &'static str, e: password_hash::Error) -> anyhow::Error {
    error!(error = %e, stage, "password hashing failed");
    anyhow::anyhow!("{stage}: {e}")
}

/// Argon2id with a fresh salt per credential.
pub fn hash_password(raw: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| hash_failure("hash credential", e))
}

/// `Ok(false)` for a mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(raw: &str, stored: &str) -> anyhow::Result<bool> {
    let stored = PasswordHash::new(stored).map_err(|e| hash_failure("parse stored hash", e))?;
    match Argon2::default().verify_password(raw.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(hash_failure("verify credential", e)),
    }
}
