//! Snippetbox entry-point: loads settings, prepares storage and serves.

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use snippetbox::inbound::http::session_config::{
    BuildMode, DefaultSessionEnv, fingerprint::key_fingerprint, session_settings_from_env,
};
use snippetbox::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use snippetbox::server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.addr().map_err(std::io::Error::other)?;
    let session_lifetime_hours = settings
        .session_lifetime_hours()
        .map_err(std::io::Error::other)?;

    let session = session_settings_from_env(
        &DefaultSessionEnv::new(),
        BuildMode::from_debug_assertions(),
    )
    .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_static_dir(settings.static_dir())
    .with_session_lifetime_hours(session_lifetime_hours);

    if let Some(database_url) = settings.database_url.clone() {
        if settings.migrate {
            let url = database_url.clone();
            let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
                .await
                .map_err(std::io::Error::other)?
                .map_err(std::io::Error::other)?;
            info!(applied, "database migrations complete");
        }
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|e| std::io::Error::other(e.into_message()))?;
        config = config.with_db_pool(pool);
    } else if settings.migrate {
        warn!("--migrate ignored: no database URL configured");
    }

    info!(addr = %bind_addr, "starting server");
    create_server(config)?.await
}
