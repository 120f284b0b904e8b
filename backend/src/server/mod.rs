//! Server construction and middleware wiring.

mod config;
pub mod settings;
mod state_builders;

pub use config::{CLIENT_DISCONNECT_TIMEOUT, CLIENT_REQUEST_TIMEOUT, KEEP_ALIVE, ServerConfig};
pub use settings::{AppSettings, SettingsError};
pub use state_builders::build_http_state;

use state_builders::http_state_for;

use std::path::PathBuf;
use std::sync::Arc;

use actix_files::Files;
use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession, TtlExtensionPolicy},
    storage::CookieSessionStore,
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::ContentType;
use actix_web::{App, HttpResponse, HttpServer, web};
use mockable::DefaultClock;

use crate::inbound::http::{self, state::HttpState};
use crate::middleware::{Authenticate, CsrfProtection, RecoverPanic, Trace, security_headers};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Everything [`build_app`] needs; cheap to clone per worker.
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    pub static_dir: PathBuf,
    pub session_lifetime_hours: i64,
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::plaintext())
        .body("Not Found")
}

/// Build the application with routes and the full middleware chain.
///
/// From the outside in: request logging, panic recovery, security headers,
/// CSRF verification, the cookie session and session authentication.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
        static_dir,
        session_lifetime_hours,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(CookieDuration::hours(session_lifetime_hours))
                .session_ttl_extension_policy(TtlExtensionPolicy::OnEveryRequest),
        )
        .build();

    App::new()
        .app_data(http_state)
        .configure(http::configure)
        .service(Files::new("/static", static_dir))
        .default_service(web::to(not_found))
        .wrap(Authenticate)
        .wrap(session)
        .wrap(CsrfProtection::new(cookie_secure))
        .wrap(security_headers())
        .wrap(RecoverPanic)
        .wrap(Trace)
}

/// Construct an Actix HTTP server from `config`.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the HTTP state cannot be built or
/// binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(
        http_state_for(config.db_pool.as_ref(), Arc::new(DefaultClock))
            .map_err(std::io::Error::other)?,
    );
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        static_dir,
        session_lifetime_hours,
    } = config;

    let deps = AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
        static_dir,
        session_lifetime_hours,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .keep_alive(KEEP_ALIVE)
        .client_request_timeout(CLIENT_REQUEST_TIMEOUT)
        .client_disconnect_timeout(CLIENT_DISCONNECT_TIMEOUT)
        .bind(bind_addr)?
        .run();
    Ok(server)
}
