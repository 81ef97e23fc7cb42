//! Write-only passwords and their Argon2id hashes.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash as ParsedHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use thiserror::Error;
use zeroize::Zeroizing;

use super::{TraceId, UserValidationError};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length in characters.
pub const PASSWORD_MAX: usize = 128;

// OWASP ASVS: m=19456 (19 MiB), t=2, p=1.
const ARGON2_MEMORY_KIB: u32 = 19_456;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// Cleartext password supplied by a client.
///
/// The buffer is zeroed on drop and `Debug` never prints it.
#[derive(Clone)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Validate password length.
    ///
    /// # Errors
    /// Returns [`UserValidationError::PasswordTooShort`] or
    /// [`UserValidationError::PasswordTooLong`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = Zeroizing::new(raw.into());
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(UserValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(raw))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(<redacted>)")
    }
}

/// Failures raised while hashing or checking passwords.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Hashing itself failed.
    #[error("password hashing failed: {message}")]
    Hash {
        /// Underlying cause.
        message: String,
    },
    /// A stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {message}")]
    Malformed {
        /// Underlying cause.
        message: String,
    },
    /// The blocking worker did not complete.
    #[error("password worker failed: {message}")]
    Worker {
        /// Underlying cause.
        message: String,
    },
}

/// Argon2id hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string loaded from storage.
    ///
    /// # Errors
    /// Returns [`PasswordError::Malformed`] when the string does not parse.
    pub fn from_phc(raw: impl Into<String>) -> Result<Self, PasswordError> {
        let raw = raw.into();
        ParsedHash::new(&raw).map_err(|err| PasswordError::Malformed {
            message: err.to_string(),
        })?;
        Ok(Self(raw))
    }

    /// Hash `password` on the calling thread.
    ///
    /// # Errors
    /// Returns [`PasswordError::Hash`] when Argon2 rejects its inputs.
    pub fn derive_blocking(password: &PlainPassword) -> Result<Self, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordError::Hash {
                message: err.to_string(),
            })?;
        Ok(Self(hash.to_string()))
    }

    /// Hash `password` on the blocking pool so request workers stay free.
    ///
    /// # Errors
    /// Returns [`PasswordError::Hash`] on hashing failure and
    /// [`PasswordError::Worker`] if the blocking task is lost.
    pub async fn derive(password: &PlainPassword) -> Result<Self, PasswordError> {
        let password = password.clone();
        TraceId::spawn_blocking(move || Self::derive_blocking(&password))
            .await
            .map_err(|err| PasswordError::Worker {
                message: err.to_string(),
            })?
    }

    /// PHC string for storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, None)
        .map_err(|err| PasswordError::Hash {
            message: err.to_string(),
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
