//! Recordkeeper entry-point: loads settings, prepares storage and serves the
//! REST API with its health probes.

mod server;

use actix_web::cookie::SameSite;
use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recordkeeper::inbound::http::health::HealthState;
use recordkeeper::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let same_site = if cfg!(debug_assertions) {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let mut config = ServerConfig::new(
        settings.session_key()?,
        settings.cookie_secure(),
        same_site,
        settings.bind_addr()?,
    );

    if let Some(pool_config) = settings.pool_config() {
        let applied = run_pending_migrations(pool_config.database_url())
            .await
            .wrap_err("database migrations failed")?;
        info!(applied, "database schema up to date");
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }
    if let Some(admin) = settings.bootstrap_admin()? {
        config = config.with_bootstrap_admin(admin);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!("server started");
    server.await?;
    Ok(())
}
