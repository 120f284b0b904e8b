//! Account use-cases: signup, login and profile lookup.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{
    LoginService, NewUserRecord, UserProfileQuery, UserRegistration, UserRepository,
    UserRepositoryError,
};
use crate::domain::{CredentialHasher, Error, LoginCredentials, NewUser, User, UserId};

use super::password::PasswordHashError;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Implements [`UserRegistration`], [`LoginService`] and [`UserProfileQuery`].
#[derive(Clone)]
pub struct AccountService<R> {
    repository: Arc<R>,
    hasher: CredentialHasher,
    clock: Arc<dyn Clock>,
}

impl<R> AccountService<R> {
    pub fn new(repository: Arc<R>, hasher: CredentialHasher, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            hasher,
            clock,
        }
    }
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::DuplicateEmail => Error::conflict("email address already registered"),
        UserRepositoryError::Connection { message } => {
            Error::internal(format!("user store unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user store query failed: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

#[async_trait]
impl<R> UserRegistration for AccountService<R>
where
    R: UserRepository + 'static,
{
    async fn register(&self, user: NewUser) -> Result<UserId, Error> {
        let hashed_password = self
            .hasher
            .hash_blocking(Zeroizing::new(user.password().to_owned()))
            .await
            .map_err(map_hash_error)?;
        let record = NewUserRecord {
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            hashed_password,
            created: self.clock.utc(),
        };
        self.repository
            .insert(&record)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> LoginService for AccountService<R>
where
    R: UserRepository + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(stored) = self
            .repository
            .find_credentials(credentials.email())
            .await
            .map_err(map_repository_error)?
        else {
            debug!("login attempt for unknown email");
            self.hasher
                .verify_dummy_blocking(Zeroizing::new(credentials.password().to_owned()))
                .await
                .map_err(map_hash_error)?;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify_blocking(
                Zeroizing::new(credentials.password().to_owned()),
                stored.hashed_password,
            )
            .await
            .map_err(map_hash_error)?;
        if matches {
            Ok(stored.id)
        } else {
            debug!(user_id = %stored.id, "login attempt with wrong password");
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl<R> UserProfileQuery for AccountService<R>
where
    R: UserRepository + 'static,
{
    async fn fetch_profile(&self, user_id: UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
