//! Run one zone import to completion and print its terminal status.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use backend::app::{AppComponents, ExternalServices, Repositories, ServerSettings};
use backend::domain::ImportState;
use backend::domain::ports::{Zone, ZoneRepository};
use backend::outbound::persistence::{DbPool, PoolConfig};
use chrono::Utc;
use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

/// `import-zone` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-zone",
    about = "Fetch, enrich and store the POIs of one zone",
    version
)]
struct CliArgs {
    /// Zone UUID or unique zone name.
    #[arg(value_name = "zone")]
    zone: String,
    /// Database connection URL. Falls back to `AUDIOGUIDE_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Content language override, e.g. `fr`.
    #[arg(long = "language", value_name = "code")]
    language: Option<String>,
}

/// How the operator named the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ZoneSelector {
    Id(Uuid),
    Name(String),
}

impl ZoneSelector {
    fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("zone must not be empty".to_owned());
        }
        Ok(Uuid::parse_str(trimmed)
            .map(Self::Id)
            .unwrap_or_else(|_| Self::Name(trimmed.to_owned())))
    }

    async fn resolve(&self, zones: &dyn ZoneRepository) -> io::Result<Zone> {
        let found = match self {
            Self::Id(id) => zones.find_zone(*id).await,
            Self::Name(name) => zones.find_zone_by_name(name).await,
        }
        .map_err(|error| io::Error::other(format!("load zone: {error}")))?;
        found.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("zone {self:?} not found"))
        })
    }
}

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("create Tokio runtime: {error}");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(async_main(args)) {
        Ok(ImportState::Completed) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn async_main(args: CliArgs) -> io::Result<ImportState> {
    let selector = ZoneSelector::parse(&args.zone)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let mut settings = ServerSettings::load_from_iter([OsString::from("import-zone")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    if let Some(url) = args.database_url {
        settings.database_url = Some(url);
    }
    if let Some(language) = args.language {
        settings.content_language = Some(language);
    }

    let database_url = settings.database_url().map_err(io::Error::other)?;
    let pool = DbPool::connect(database_url, PoolConfig::single_import())
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let services = ExternalServices::from_settings(&settings).map_err(io::Error::other)?;
    let components = AppComponents::assemble(
        services,
        Repositories::postgres(pool),
        settings.content_language(),
    );

    let zone = selector.resolve(components.zones.as_ref()).await?;
    components
        .pipeline
        .registry()
        .start(zone.id, Utc::now())
        .map_err(io::Error::other)?;
    let status = components.pipeline.run(&zone).await;

    let json = serde_json::to_string_pretty(&status)
        .map_err(|error| io::Error::other(format!("serialize status: {error}")))?;
    println!("{json}");
    Ok(status.state)
}
