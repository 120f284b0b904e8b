//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SNIPPETBOX_*` environment variables and an
//! optional configuration file. Session cookie settings are handled
//! separately by [`session_config`](crate::inbound::http::session_config).

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_ADDR: &str = "0.0.0.0:4000";
const DEFAULT_STATIC_DIR: &str = "./ui/static";
const DEFAULT_SESSION_LIFETIME_HOURS: i64 = 12;

/// Failure interpreting a loaded setting.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid listen address {value:?}: {source}")]
    Addr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("session lifetime must be at least one hour, got {0}")]
    SessionLifetime(i64),
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SNIPPETBOX")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub addr: Option<String>,
    /// PostgreSQL connection URL; in-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Directory served under `/static`.
    pub static_dir: Option<PathBuf>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub migrate: bool,
    /// Idle lifetime of a session, refreshed on every request.
    pub session_lifetime_hours: Option<i64>,
}

impl AppSettings {
    /// The listen address, falling back to `0.0.0.0:4000`.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Addr`] when the configured value is not a socket
    /// address.
    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.addr.as_deref().unwrap_or(DEFAULT_ADDR);
        value.parse().map_err(|source| SettingsError::Addr {
            value: value.to_owned(),
            source,
        })
    }

    /// The static asset directory, falling back to `./ui/static`.
    pub fn static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
    }

    /// The session lifetime in hours, falling back to 12.
    ///
    /// # Errors
    ///
    /// [`SettingsError::SessionLifetime`] for values below one hour.
    pub fn session_lifetime_hours(&self) -> Result<i64, SettingsError> {
        match self.session_lifetime_hours {
            None => Ok(DEFAULT_SESSION_LIFETIME_HOURS),
            Some(hours) if hours >= 1 => Ok(hours),
            Some(hours) => Err(SettingsError::SessionLifetime(hours)),
        }
    }
}
