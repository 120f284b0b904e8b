//! Driving port for creating snippets.

use async_trait::async_trait;

use crate::domain::{Error, NewSnippet, SnippetId};

/// Use-case port invoked by the create-snippet handler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnippetCommand: Send + Sync {
    /// Store a snippet that expires `snippet.expires` days from now.
    async fn create(&self, snippet: NewSnippet) -> Result<SnippetId, Error>;
}
