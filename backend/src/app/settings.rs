//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `AUDIOGUIDE_*` environment variables and
//! configuration files. Every field is optional; accessors supply defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DEFAULT_CONTENT_LANGUAGE;
use crate::outbound::wikipedia::DEFAULT_REST_URL_TEMPLATE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_WIKIDATA_SPARQL_URL: &str = "https://query.wikidata.org/sparql";
const DEFAULT_WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "mistral";
const DEFAULT_USER_AGENT: &str = "audioguide-backend/0.1";
const DEFAULT_OVERPASS_INTERVAL_MS: u64 = 1_000;
const DEFAULT_WIKIDATA_INTERVAL_MS: u64 = 100;
const DEFAULT_WIKIPEDIA_INTERVAL_MS: u64 = 200;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_LLM_TIMEOUT_SECONDS: u64 = 120;

/// Invalid or missing configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("database URL missing: set AUDIOGUIDE_DATABASE_URL or --database-url")]
    MissingDatabaseUrl,
    #[error("{field} is not a valid URL ({value}): {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("bind address {value} is invalid: {reason}")]
    InvalidBindAddr { value: String, reason: String },
}

/// Backend configuration shared by the server and the `import-zone` tool.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AUDIOGUIDE")]
pub struct ServerSettings {
    /// Socket address for the HTTP listener.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Skip embedded migrations at startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
    /// Overpass interpreter endpoint.
    pub overpass_url: Option<String>,
    /// Wikidata SPARQL endpoint.
    pub wikidata_sparql_url: Option<String>,
    /// Wikidata action API endpoint.
    pub wikidata_api_url: Option<String>,
    /// Wikipedia REST base; `{lang}` is replaced per article.
    pub wikipedia_rest_url: Option<String>,
    /// Ollama server base URL.
    pub ollama_url: Option<String>,
    /// Ollama model name.
    pub ollama_model: Option<String>,
    /// Minimum spacing between Overpass calls, in milliseconds.
    pub overpass_interval_ms: Option<u64>,
    /// Minimum spacing between Wikidata calls, in milliseconds.
    pub wikidata_interval_ms: Option<u64>,
    /// Minimum spacing between Wikipedia calls, in milliseconds.
    pub wikipedia_interval_ms: Option<u64>,
    /// Timeout for knowledge-service requests, in seconds.
    pub http_timeout_seconds: Option<u64>,
    /// Timeout for script generation, in seconds.
    pub llm_timeout_seconds: Option<u64>,
    /// Preferred language for descriptions and articles.
    pub content_language: Option<String>,
    /// User agent sent to every external service.
    pub user_agent: Option<String>,
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|error| SettingsError::InvalidUrl {
        field,
        value: value.to_owned(),
        reason: error.to_string(),
    })
}

impl ServerSettings {
    /// Listener address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|error: std::net::AddrParseError| {
            SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                reason: error.to_string(),
            }
        })
    }

    /// Database URL; required.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] for an unparsable override.
    pub fn overpass_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "overpass_url",
            self.overpass_url.as_deref().unwrap_or(DEFAULT_OVERPASS_URL),
        )
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] for an unparsable override.
    pub fn wikidata_sparql_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "wikidata_sparql_url",
            self.wikidata_sparql_url
                .as_deref()
                .unwrap_or(DEFAULT_WIKIDATA_SPARQL_URL),
        )
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] for an unparsable override.
    pub fn wikidata_api_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "wikidata_api_url",
            self.wikidata_api_url
                .as_deref()
                .unwrap_or(DEFAULT_WIKIDATA_API_URL),
        )
    }

    pub fn wikipedia_rest_url(&self) -> &str {
        self.wikipedia_rest_url
            .as_deref()
            .unwrap_or(DEFAULT_REST_URL_TEMPLATE)
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] for an unparsable override.
    pub fn ollama_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "ollama_url",
            self.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL),
        )
    }

    pub fn ollama_model(&self) -> &str {
        self.ollama_model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL)
    }

    pub fn overpass_interval(&self) -> Duration {
        Duration::from_millis(
            self.overpass_interval_ms
                .unwrap_or(DEFAULT_OVERPASS_INTERVAL_MS),
        )
    }

    pub fn wikidata_interval(&self) -> Duration {
        Duration::from_millis(
            self.wikidata_interval_ms
                .unwrap_or(DEFAULT_WIKIDATA_INTERVAL_MS),
        )
    }

    pub fn wikipedia_interval(&self) -> Duration {
        Duration::from_millis(
            self.wikipedia_interval_ms
                .unwrap_or(DEFAULT_WIKIPEDIA_INTERVAL_MS),
        )
    }

    /// Knowledge-service request timeout; zero falls back to the default.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http_timeout_seconds
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS),
        )
    }

    /// Generation timeout; zero falls back to the default.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(
            self.llm_timeout_seconds
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_LLM_TIMEOUT_SECONDS),
        )
    }

    /// Lowercased content language.
    pub fn content_language(&self) -> String {
        self.content_language
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_CONTENT_LANGUAGE)
            .to_lowercase()
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}
