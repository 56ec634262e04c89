//! Backend entry-point: migrations, service wiring and the admin HTTP server.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::app::{AppComponents, ExternalServices, Repositories, ServerSettings};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, create_server};

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

    let settings = ServerSettings::load()
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let database_url = settings.database_url().map_err(io::Error::other)?;
    if settings.skip_migrations {
        warn!("skipping database migrations");
    } else {
        run_migrations(database_url)
            .await
            .map_err(io::Error::other)?;
    }

    let pool = DbPool::connect(database_url, PoolConfig::default())
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let services = ExternalServices::from_settings(&settings).map_err(io::Error::other)?;
    let components = AppComponents::assemble(
        services,
        Repositories::postgres(pool),
        settings.content_language(),
    );

    let http_state = HttpState::new(components.zone_imports, components.audio_scripts);
    let config = ServerConfig::new(
        settings.bind_addr().map_err(io::Error::other)?,
        http_state,
    );
    info!(addr = %config.bind_addr(), "starting HTTP server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
