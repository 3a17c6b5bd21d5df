//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// One-way credential capability used by the member service.
pub trait CredentialVerifier: Send + Sync {
    /// Hash a plaintext secret into a PHC-format string.
    fn hash(&self, plaintext: &str) -> Result<String, AuthError>;
    /// `Ok(false)` on mismatch; `Err` only when the stored hash is
    /// malformed.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id with an optional pepper.
#[derive(Debug, Clone, Default)]
pub struct Argon2Credentials {
    pepper: Option<String>,
}

impl Argon2Credentials {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }
}

impl CredentialVerifier for Argon2Credentials {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        hash_password(plaintext, self.pepper.as_deref())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError> {
        verify_password(plaintext, hash, self.pepper.as_deref())
    }
}

fn peppered(password: &str, pepper: Option<&str>) -> Vec<u8> {
    match pepper {
        Some(p) => format!("{p}{password}").into_bytes(),
        None => password.as_bytes().to_vec(),
    }
}

/// Hash a plaintext password with a fresh random salt.
///
/// If `pepper` is provided it is prepended to the password; the same
/// pepper must be supplied to [`verify_password`].
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let input = peppered(password, pepper);
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(&input, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("hash error: {e}")))
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let input = peppered(password, pepper);

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(&input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}
