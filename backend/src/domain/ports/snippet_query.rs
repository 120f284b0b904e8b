//! Driving port for reading snippets.
//!
//! Reads only ever observe unexpired snippets; an expired snippet is
//! indistinguishable from one that never existed.

use async_trait::async_trait;

use crate::domain::{Error, Snippet, SnippetId};

/// Use-case port for the home listing and the snippet page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnippetQuery: Send + Sync {
    /// Fetch one visible snippet, or [`ErrorCode::NotFound`](crate::domain::ErrorCode::NotFound).
    async fn get(&self, id: SnippetId) -> Result<Snippet, Error>;

    /// The most recent visible snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>, Error>;
}
