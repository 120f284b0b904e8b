//! Driving port for account signup.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, UserId};

/// Use-case port invoked by the signup handler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Hash the password and store the account.
    ///
    /// A taken email fails with [`ErrorCode::Conflict`](crate::domain::ErrorCode::Conflict).
    async fn register(&self, user: NewUser) -> Result<UserId, Error>;
}
