//! Backend entry-point: loads settings, wires adapters and serves the REST API.

mod server;

use std::io;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use employee_backend::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings,
};
use employee_backend::outbound::persistence::{DbPool, run_migrations};
use employee_backend::settings::AppSettings;
use ortho_config::OrthoConfig;
use server::{ServerConfig, build_cache, build_health_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let session = session_settings(&settings.session_toggles(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
    )
    .with_resilience(settings.resilience_config())
    .with_cache(build_cache(&settings).await?);

    if let Some(pool_config) = settings.pool_config() {
        let applied = run_migrations(pool_config.database_url())
            .await
            .map_err(io::Error::other)?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = build_health_state(&config);
    info!(addr = %settings.bind_addr(), "starting employee backend");
    create_server(health_state, config)?.await
}
