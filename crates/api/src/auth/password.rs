//! Argon2id password hashing and the login password check.
//!
//! The admin password is configured either as a PHC-formatted Argon2 hash
//! (preferred) or as plaintext.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::config::AuthConfig;

/// Longest password the login endpoint will look at.
pub const MAX_PASSWORD_LENGTH: usize = 1000;

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string, suitable for `AUTH_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted Argon2 hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check a login attempt against the configured password.
///
/// The hash wins when both are configured. A malformed hash never matches.
pub fn password_matches(config: &AuthConfig, candidate: &str) -> bool {
    if let Some(hash) = &config.password_hash {
        return match verify_password(candidate, hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Configured password hash could not be used");
                false
            }
        };
    }
    config
        .plain_password
        .as_deref()
        .is_some_and(|plain| plain == candidate)
}
