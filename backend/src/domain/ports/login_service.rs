//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to check credentials without knowing how
//! accounts are stored, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown emails and wrong passwords fail with the same
    /// [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized) error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
