//! Driving port for user profile queries.
//!
//! The authentication middleware resolves the session's user id through this
//! port on every request.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading a user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile, or [`ErrorCode::NotFound`](crate::domain::ErrorCode::NotFound).
    async fn fetch_profile(&self, user_id: UserId) -> Result<User, Error>;
}
