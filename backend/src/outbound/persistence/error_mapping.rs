//! Classification of pool and Diesel failures for the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// What a failed Diesel call means to a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DieselFailure {
    /// The connection dropped mid-query.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Anything else.
    Query(String),
}

/// Sort a Diesel error into a [`DieselFailure`], logging the raw cause.
pub(super) fn classify(error: DieselError, operation: &str) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                },
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection closed".to_owned())
                }
                _ => DieselFailure::Query(format!("{operation}: database error")),
            }
        }
        other => {
            debug!(error = %other, operation, "diesel operation failed");
            DieselFailure::Query(format!("{operation}: {other}"))
        }
    }
}
