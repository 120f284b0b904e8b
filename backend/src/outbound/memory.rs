//! In-memory repository adapters.
//!
//! Used when no database URL is configured and by HTTP tests. Data lives for
//! the lifetime of the process. Semantics mirror the PostgreSQL adapters:
//! identifiers start at 1, expired rows are hidden from reads and email
//! addresses are unique (case-sensitive, as with the SQL constraint).

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    NewSnippetRecord, NewUserRecord, SnippetRepository, SnippetRepositoryError,
    StoredCredentials, UserRepository, UserRepositoryError,
};
use crate::domain::{Snippet, SnippetId, User, UserId};

/// Process-local snippet store.
#[derive(Debug, Default)]
pub struct InMemorySnippetRepository {
    rows: Mutex<Vec<Snippet>>,
}

impl InMemorySnippetRepository {
    fn rows(&self) -> Result<MutexGuard<'_, Vec<Snippet>>, SnippetRepositoryError> {
        self.rows
            .lock()
            .map_err(|_| SnippetRepositoryError::query("snippet store lock poisoned"))
    }

    /// Number of stored rows, expired ones included.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or_default()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnippetRepository for InMemorySnippetRepository {
    async fn insert(&self, record: &NewSnippetRecord) -> Result<SnippetId, SnippetRepositoryError> {
        let mut rows = self.rows()?;
        let next = i64::try_from(rows.len())
            .map_err(|_| SnippetRepositoryError::query("snippet id space exhausted"))?
            + 1;
        let id = SnippetId::new(next)
            .map_err(|err| SnippetRepositoryError::query(err.to_string()))?;
        rows.push(Snippet {
            id,
            title: record.title.clone(),
            content: record.content.clone(),
            created: record.created,
            expires: record.expires,
        });
        Ok(id)
    }

    async fn find_unexpired(
        &self,
        id: SnippetId,
        now: DateTime<Utc>,
    ) -> Result<Option<Snippet>, SnippetRepositoryError> {
        let rows = self.rows()?;
        Ok(rows
            .iter()
            .find(|snippet| snippet.id == id && snippet.is_live_at(now))
            .cloned())
    }

    async fn latest_unexpired(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Snippet>, SnippetRepositoryError> {
        let rows = self.rows()?;
        let mut live: Vec<Snippet> = rows
            .iter()
            .filter(|snippet| snippet.is_live_at(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        live.truncate(limit);
        Ok(live)
    }
}

#[derive(Debug, Clone)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    hashed_password: String,
    created: DateTime<Utc>,
}

/// Process-local user store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<UserRow>>,
}

impl InMemoryUserRepository {
    fn rows(&self) -> Result<MutexGuard<'_, Vec<UserRow>>, UserRepositoryError> {
        self.rows
            .lock()
            .map_err(|_| UserRepositoryError::query("user store lock poisoned"))
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or_default()
    }

    /// Whether no account has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<UserId, UserRepositoryError> {
        let mut rows = self.rows()?;
        if rows.iter().any(|row| row.email == record.email) {
            return Err(UserRepositoryError::duplicate_email());
        }
        let next = i64::try_from(rows.len())
            .map_err(|_| UserRepositoryError::query("user id space exhausted"))?
            + 1;
        let id = UserId::new(next);
        rows.push(UserRow {
            id,
            name: record.name.clone(),
            email: record.email.clone(),
            hashed_password: record.hashed_password.clone(),
            created: record.created,
        });
        Ok(id)
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let rows = self.rows()?;
        Ok(rows
            .iter()
            .find(|row| row.email == email)
            .map(|row| StoredCredentials {
                id: row.id,
                hashed_password: row.hashed_password.clone(),
            }))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let rows = self.rows()?;
        Ok(rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| User::new(row.id, row.name.clone(), row.email.clone(), row.created)))
    }
}
