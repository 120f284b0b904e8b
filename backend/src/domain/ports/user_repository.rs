//! Driven port for user account storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "user repository query failed: {message}",
        /// The email address is already registered.
        DuplicateEmail => "email address is already registered",
    }
}

/// Account row to insert. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub created: DateTime<Utc>,
}

/// Identifier and password hash looked up by email for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub id: UserId,
    pub hashed_password: String,
}

/// Persistence operations for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Must return [`UserRepositoryError::DuplicateEmail`] when the email is
    /// already taken, leaving the existing row untouched.
    async fn insert(&self, record: &NewUserRecord) -> Result<UserId, UserRepositoryError>;

    /// Look up the stored hash for an email address.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Load a user's public profile.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;
}
