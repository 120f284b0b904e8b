//! Builders wiring repositories into services and services into
//! [`HttpState`].

use std::sync::Arc;

use mockable::Clock;
use tracing::warn;

use crate::domain::ports::{SnippetRepository, UserRepository};
use crate::domain::{AccountService, CredentialHasher, SnippetService};
use crate::inbound::http::state::{HttpState, HttpStatePorts, StateError};
use crate::outbound::memory::{InMemorySnippetRepository, InMemoryUserRepository};
use crate::outbound::persistence::{DbPool, DieselSnippetRepository, DieselUserRepository};

/// Assemble HTTP state over the given repositories.
///
/// One [`SnippetService`] backs both snippet ports and one
/// [`AccountService`] backs the three account ports.
///
/// # Errors
///
/// [`StateError`] when the templates or validation patterns fail to build.
pub fn build_http_state<S, U>(
    snippets: Arc<S>,
    users: Arc<U>,
    hasher: CredentialHasher,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, StateError>
where
    S: SnippetRepository + 'static,
    U: UserRepository + 'static,
{
    let snippet_service = Arc::new(SnippetService::new(snippets, Arc::clone(&clock)));
    let account_service = Arc::new(AccountService::new(users, hasher, Arc::clone(&clock)));
    HttpState::try_new(
        HttpStatePorts {
            snippets: snippet_service.clone(),
            snippets_query: snippet_service,
            registration: account_service.clone(),
            login: account_service.clone(),
            profile: account_service,
        },
        clock,
    )
}

/// Diesel-backed state when a pool is configured, in-memory otherwise.
pub(crate) fn http_state_for(
    pool: Option<&DbPool>,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, StateError> {
    match pool {
        Some(pool) => build_http_state(
            Arc::new(DieselSnippetRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            CredentialHasher::default(),
            clock,
        ),
        None => {
            warn!("no database configured; snippets and accounts are kept in memory");
            build_http_state(
                Arc::new(InMemorySnippetRepository::default()),
                Arc::new(InMemoryUserRepository::default()),
                CredentialHasher::default(),
                clock,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::DefaultClock;

    use crate::domain::{ExpiryDays, NewSnippet};

    #[tokio::test]
    async fn in_memory_fallback_serves_both_snippet_ports() {
        let state = http_state_for(None, Arc::new(DefaultClock)).expect("state builds");

        let id = state
            .snippets
            .create(NewSnippet::new("title", "content", ExpiryDays::OneDay))
            .await
            .expect("create");
        let snippet = state.snippets_query.get(id).await.expect("read back");
        assert_eq!(snippet.title, "title");
    }
}
