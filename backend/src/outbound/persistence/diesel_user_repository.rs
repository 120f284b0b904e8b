//! PostgreSQL-backed [`UserRepository`].
//!
//! Duplicate signups are detected through the `users_uc_email` unique
//! constraint rather than a read-before-write, so two concurrent signups for
//! one address cannot both succeed.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    NewUserRecord, StoredCredentials, UserRepository, UserRepositoryError,
};
use crate::domain::{User, UserId};

use super::error_mapping::{DieselFailure, classify};
use super::models::{CredentialsRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Name of the unique constraint on `users.email`.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_uc_email";

/// Diesel implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(error.into_message())
}

fn map_failure(failure: DieselFailure, operation: &str) -> UserRepositoryError {
    match failure {
        DieselFailure::Connection(message) => UserRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint }
            if constraint.as_deref() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
        {
            UserRepositoryError::duplicate_email()
        }
        DieselFailure::UniqueViolation { constraint } => UserRepositoryError::query(format!(
            "{operation}: unique constraint {} violated",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DieselFailure::Query(message) => UserRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> UserRepositoryError {
    map_failure(classify(error, operation), operation)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<UserId, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            name: &record.name,
            email: &record.email,
            hashed_password: &record.hashed_password,
            created: record.created,
        };
        let id: i64 = diesel::insert_into(users::table)
            .values(&row)
            .returning(users::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert user"))?;
        Ok(UserId::new(id))
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "load credentials"))?;
        Ok(row.map(|row| StoredCredentials {
            id: UserId::new(row.id),
            hashed_password: row.hashed_password,
        }))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "load user"))?;
        Ok(row.map(|row| User::new(UserId::new(row.id), row.name, row.email, row.created)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn email_constraint_violation_is_duplicate_email() {
        let err = map_failure(
            DieselFailure::UniqueViolation {
                constraint: Some(EMAIL_UNIQUE_CONSTRAINT.to_owned()),
            },
            "insert user",
        );
        assert_eq!(err, UserRepositoryError::DuplicateEmail);
    }

    #[rstest]
    #[case::other_constraint(Some("users_pkey"))]
    #[case::unnamed(None)]
    fn other_unique_violations_stay_query_errors(#[case] constraint: Option<&str>) {
        let err = map_failure(
            DieselFailure::UniqueViolation {
                constraint: constraint.map(str::to_owned),
            },
            "insert user",
        );
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn closed_connection_is_connection_error() {
        let err = map_failure(
            DieselFailure::Connection("database connection closed".to_owned()),
            "load user",
        );
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
    }
}
