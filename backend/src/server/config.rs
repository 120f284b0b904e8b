//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};

use crate::outbound::persistence::DbPool;

const DEFAULT_SESSION_LIFETIME_HOURS: i64 = 12;
const DEFAULT_STATIC_DIR: &str = "./ui/static";

/// Connection idle limit.
pub const KEEP_ALIVE: Duration = Duration::from_secs(60);
/// Time allowed for a client to send request headers.
pub const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Time allowed for a client to disconnect after shutdown starts.
pub const CLIENT_DISCONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) static_dir: PathBuf,
    pub(crate) session_lifetime_hours: i64,
}

impl ServerConfig {
    /// Construct a server configuration from the session cookie settings and
    /// the listen address.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            session_lifetime_hours: DEFAULT_SESSION_LIFETIME_HOURS,
        }
    }

    /// Attach a database connection pool.
    ///
    /// Without one the server keeps snippets and accounts in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Serve static assets from `dir`.
    #[must_use]
    pub fn with_static_dir(mut self, dir: PathBuf) -> Self {
        self.static_dir = dir;
        self
    }

    /// Expire idle sessions after `hours`.
    #[must_use]
    pub fn with_session_lifetime_hours(mut self, hours: i64) -> Self {
        self.session_lifetime_hours = hours;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
