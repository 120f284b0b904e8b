//! Shared HTTP adapter state.
//!
//! Handlers receive [`HttpState`] through `web::Data`. It holds the driving
//! ports, the template cache and the clock; nothing in it is mutable after
//! construction.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    LoginService, SnippetCommand, SnippetQuery, UserProfileQuery, UserRegistration,
};

use super::templates::{TemplateCache, TemplateError};
use super::validation::EmailPattern;

/// Port implementations handed to [`HttpState::try_new`].
#[derive(Clone)]
pub struct HttpStatePorts {
    pub snippets: Arc<dyn SnippetCommand>,
    pub snippets_query: Arc<dyn SnippetQuery>,
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
}

/// Failure assembling the HTTP state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Templates(#[from] TemplateError),
    #[error("invalid email pattern: {0}")]
    EmailPattern(#[from] regex::Error),
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub snippets: Arc<dyn SnippetCommand>,
    pub snippets_query: Arc<dyn SnippetQuery>,
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub templates: Arc<TemplateCache>,
    pub email_pattern: EmailPattern,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Parse the templates and compile validation patterns around `ports`.
    ///
    /// # Errors
    ///
    /// [`StateError`] when a template or the email pattern fails to compile.
    pub fn try_new(ports: HttpStatePorts, clock: Arc<dyn Clock>) -> Result<Self, StateError> {
        let HttpStatePorts {
            snippets,
            snippets_query,
            registration,
            login,
            profile,
        } = ports;
        Ok(Self {
            snippets,
            snippets_query,
            registration,
            login,
            profile,
            templates: Arc::new(TemplateCache::new()?),
            email_pattern: EmailPattern::new()?,
            clock,
        })
    }
}
