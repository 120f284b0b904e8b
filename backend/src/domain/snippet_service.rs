//! Snippet use-cases backed by a [`SnippetRepository`].
//!
//! The service owns the clock: creation timestamps, expiry computation and
//! visibility checks all use the same injected [`Clock`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    NewSnippetRecord, SnippetCommand, SnippetQuery, SnippetRepository, SnippetRepositoryError,
};
use crate::domain::{Error, LATEST_SNIPPETS_LIMIT, NewSnippet, Snippet, SnippetId};

/// Implements [`SnippetCommand`] and [`SnippetQuery`].
#[derive(Clone)]
pub struct SnippetService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> SnippetService<R> {
    /// Create a service over `repository`, reading time from `clock`.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use snippetbox::domain::SnippetService;
    /// # use snippetbox::outbound::memory::InMemorySnippetRepository;
    /// let service = SnippetService::new(
    ///     Arc::new(InMemorySnippetRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

fn map_repository_error(error: SnippetRepositoryError) -> Error {
    match error {
        SnippetRepositoryError::Connection { message } => {
            Error::internal(format!("snippet store unavailable: {message}"))
        }
        SnippetRepositoryError::Query { message } => {
            Error::internal(format!("snippet store query failed: {message}"))
        }
    }
}

#[async_trait]
impl<R> SnippetCommand for SnippetService<R>
where
    R: SnippetRepository + 'static,
{
    async fn create(&self, snippet: NewSnippet) -> Result<SnippetId, Error> {
        let created = self.clock.utc();
        let record = NewSnippetRecord {
            title: snippet.title,
            content: snippet.content,
            created,
            expires: snippet.expires.expiry_from(created),
        };
        self.repository
            .insert(&record)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> SnippetQuery for SnippetService<R>
where
    R: SnippetRepository + 'static,
{
    async fn get(&self, id: SnippetId) -> Result<Snippet, Error> {
        self.repository
            .find_unexpired(id, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("snippet {id} not found")))
    }

    async fn latest(&self) -> Result<Vec<Snippet>, Error> {
        self.repository
            .latest_unexpired(self.clock.utc(), LATEST_SNIPPETS_LIMIT)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "snippet_service_tests.rs"]
mod tests;
