//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings so the algorithm parameters and salt
//! travel with the hash. Hashing is CPU bound; the async helpers move it onto
//! the blocking thread pool so request workers stay responsive.

use std::sync::{Arc, OnceLock};

use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors raised while hashing or verifying passwords.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Hashing failed, e.g. because of invalid parameters.
    #[error("password hashing failed: {message}")]
    Hash { message: String },
    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {message}")]
    MalformedHash { message: String },
    /// The blocking worker panicked or was cancelled.
    #[error("password hashing worker failed: {message}")]
    Worker { message: String },
}

/// Argon2id hasher with fixed cost parameters.
///
/// # Examples
/// ```
/// use snippetbox::domain::CredentialHasher;
///
/// let hasher = CredentialHasher::default();
/// let hash = hasher.hash("correct horse battery staple").expect("hash");
/// assert!(hasher.verify("correct horse battery staple", &hash).expect("verify"));
/// assert!(!hasher.verify("wrong", &hash).expect("verify"));
/// ```
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    /// Throwaway hash under the same parameters, built on first use.
    dummy: Arc<OnceLock<String>>,
}

const DUMMY_PASSWORD: &str = "snippetbox-dummy-password";

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl CredentialHasher {
    /// Build a hasher using explicit Argon2 cost parameters.
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            params,
            dummy: Arc::new(OnceLock::new()),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::Hash {
                message: err.to_string(),
            })
    }

    /// Check `password` against a stored PHC hash.
    ///
    /// A mismatch is `Ok(false)`; only malformed hashes are errors.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|err| PasswordHashError::MalformedHash {
                message: err.to_string(),
            })?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::MalformedHash {
                message: err.to_string(),
            }),
        }
    }

    /// Verify `password` against a throwaway hash and discard the result.
    ///
    /// Logins for unknown emails call this so they cost the same Argon2 work
    /// as a wrong password.
    pub fn verify_dummy(&self, password: &str) -> Result<(), PasswordHashError> {
        let dummy = match self.dummy.get() {
            Some(hash) => hash.clone(),
            None => {
                let hash = self.hash(DUMMY_PASSWORD)?;
                self.dummy.get_or_init(|| hash).clone()
            }
        };
        self.verify(password, &dummy).map(|_| ())
    }

    #[cfg(test)]
    pub(crate) fn dummy_ready(&self) -> bool {
        self.dummy.get().is_some()
    }

    /// [`Self::hash`] on the blocking thread pool.
    pub async fn hash_blocking(
        &self,
        password: Zeroizing<String>,
    ) -> Result<String, PasswordHashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| PasswordHashError::Worker {
                message: err.to_string(),
            })?
    }

    /// [`Self::verify`] on the blocking thread pool.
    pub async fn verify_blocking(
        &self,
        password: Zeroizing<String>,
        stored_hash: String,
    ) -> Result<bool, PasswordHashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|err| PasswordHashError::Worker {
                message: err.to_string(),
            })?
    }

    /// [`Self::verify_dummy`] on the blocking thread pool.
    pub async fn verify_dummy_blocking(
        &self,
        password: Zeroizing<String>,
    ) -> Result<(), PasswordHashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .map_err(|err| PasswordHashError::Worker {
                message: err.to_string(),
            })?
    }
}
