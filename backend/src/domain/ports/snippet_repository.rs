//! Driven port for snippet storage.
//!
//! Adapters never decide visibility on their own: every read takes the
//! caller's `now` so expiry is evaluated against the domain clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Snippet, SnippetId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by snippet repository adapters.
    pub enum SnippetRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "snippet repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "snippet repository query failed: {message}",
    }
}

/// Row to insert; timestamps are already resolved by the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnippetRecord {
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// Persistence operations for snippets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnippetRepository: Send + Sync {
    /// Store a snippet and return its generated identifier.
    async fn insert(&self, record: &NewSnippetRecord) -> Result<SnippetId, SnippetRepositoryError>;

    /// Fetch a snippet whose expiry is strictly after `now`.
    ///
    /// Returns `None` both for unknown ids and for expired rows.
    async fn find_unexpired(
        &self,
        id: SnippetId,
        now: DateTime<Utc>,
    ) -> Result<Option<Snippet>, SnippetRepositoryError>;

    /// Up to `limit` unexpired snippets, newest created first.
    async fn latest_unexpired(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Snippet>, SnippetRepositoryError>;
}
