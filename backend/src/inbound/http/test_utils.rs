//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, HttpMessage, HttpResponse, test, web};
use chrono::{TimeZone, Utc};

use crate::domain::UserId;
use crate::domain::ports::{
    MockLoginService, MockSnippetCommand, MockSnippetQuery, MockUserProfileQuery,
    MockUserRegistration,
};
use crate::middleware::{Authenticate, CsrfToken};
use crate::test_support::MutableClock;

use super::HttpResult;
use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};

pub(crate) const TEST_SESSION_COOKIE: &str = "session";

/// Token [`init_html_app`] embeds in every rendered form.
pub(crate) const TEST_CSRF_TOKEN: &str = "test-csrf-token";

/// Session middleware with a fresh key and a non-`Secure` cookie named
/// `session`, for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(TEST_SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by `response`, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == TEST_SESSION_COOKIE)
        .map(Cookie::into_owned)
}

struct MockPorts {
    snippets: MockSnippetCommand,
    snippets_query: MockSnippetQuery,
    registration: MockUserRegistration,
    login: MockLoginService,
    profile: MockUserProfileQuery,
}

impl Default for MockPorts {
    fn default() -> Self {
        Self {
            snippets: MockSnippetCommand::new(),
            snippets_query: MockSnippetQuery::new(),
            registration: MockUserRegistration::new(),
            login: MockLoginService::new(),
            profile: MockUserProfileQuery::new(),
        }
    }
}

impl MockPorts {
    fn into_state(self) -> HttpState {
        let clock = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        HttpState::try_new(
            HttpStatePorts {
                snippets: Arc::new(self.snippets),
                snippets_query: Arc::new(self.snippets_query),
                registration: Arc::new(self.registration),
                login: Arc::new(self.login),
                profile: Arc::new(self.profile),
            },
            Arc::new(MutableClock::new(clock)),
        )
        .expect("HTTP state builds")
    }
}

/// State whose ports are all mocks, with `profile` supplied by the caller.
pub fn mock_state(profile: MockUserProfileQuery) -> HttpState {
    MockPorts {
        profile,
        ..MockPorts::default()
    }
    .into_state()
}

/// State whose snippet reads go to `query`.
pub fn mock_state_with(query: MockSnippetQuery) -> HttpState {
    MockPorts {
        snippets_query: query,
        ..MockPorts::default()
    }
    .into_state()
}

/// State whose account writes go to the given mocks.
pub fn mock_state_with_accounts(
    registration: MockUserRegistration,
    login: MockLoginService,
) -> HttpState {
    MockPorts {
        registration,
        login,
        ..MockPorts::default()
    }
    .into_state()
}

async fn sign_in_as(session: SessionContext, path: web::Path<i64>) -> HttpResult<HttpResponse> {
    session.persist_user(UserId::new(path.into_inner()))?;
    Ok(HttpResponse::Ok().finish())
}

/// The HTML routes behind session authentication, without CSRF checks.
///
/// Every request carries [`TEST_CSRF_TOKEN`] in place of a verified token.
/// `GET /test/sign-in/{id}` stores a user id claim directly.
pub async fn init_html_app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Authenticate)
            .wrap_fn(|req, srv| {
                req.extensions_mut()
                    .insert(CsrfToken::from_masked(TEST_CSRF_TOKEN.to_owned()));
                srv.call(req)
            })
            .wrap(test_session_middleware())
            .route("/test/sign-in/{id}", web::get().to(sign_in_as))
            .configure(super::configure),
    )
    .await
}
