//! Reqwest-backed Overpass POI source.
//!
//! This adapter owns transport details only: query construction, rate
//! limiting, timeout and HTTP error mapping, and JSON decoding into raw POIs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::OverpassResponseDto;
use crate::domain::overpass_tag_filters;
use crate::domain::ports::{PoiQuery, PoiSource, PoiSourceError};
use crate::domain::RawPoi;
use crate::outbound::http_support::body_preview;
use crate::outbound::rate_limiter::RateLimiter;

const DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS: u32 = 25;
const DEFAULT_USER_AGENT: &str = "audioguide-backend/0.1";
/// Largest accepted search radius.
pub const MAX_RADIUS_KM: f64 = 50.0;

/// Outbound identity and query timeout settings for Overpass requests.
#[derive(Debug, Clone)]
pub struct OverpassHttpIdentity {
    /// HTTP user-agent sent to Overpass.
    pub user_agent: String,
    /// Timeout directive embedded in Overpass query text.
    pub query_timeout_seconds: u32,
}

impl Default for OverpassHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            query_timeout_seconds: DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS,
        }
    }
}

/// Overpass source adapter posting one query per zone.
pub struct OverpassHttpSource {
    client: Client,
    endpoint: Url,
    limiter: Arc<RateLimiter>,
    user_agent: String,
    query_timeout_seconds: u32,
}

impl OverpassHttpSource {
    /// Build an adapter with an explicit request timeout and identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        limiter: Arc<RateLimiter>,
        identity: OverpassHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            limiter,
            user_agent: identity.user_agent,
            query_timeout_seconds: identity.query_timeout_seconds.max(1),
        })
    }
}

#[async_trait]
impl PoiSource for OverpassHttpSource {
    async fn fetch_pois(&self, query: &PoiQuery) -> Result<Vec<RawPoi>, PoiSourceError> {
        let text = build_overpass_query(query, self.query_timeout_seconds)?;
        self.limiter.acquire().await;
        debug!(endpoint = %self.endpoint, radius_km = query.radius_km, "querying overpass");
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", text)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_pois(body.as_ref())
    }
}

pub(crate) fn parse_pois(body: &[u8]) -> Result<Vec<RawPoi>, PoiSourceError> {
    let decoded: OverpassResponseDto = serde_json::from_slice(body).map_err(|error| {
        PoiSourceError::decode(format!("invalid Overpass JSON payload: {error}"))
    })?;
    Ok(decoded.into_raw_pois())
}

fn build_overpass_query(
    query: &PoiQuery,
    query_timeout_seconds: u32,
) -> Result<String, PoiSourceError> {
    validate_query(query)?;
    let around = format!(
        "(around:{radius_m:.0},{lat},{lng})",
        radius_m = query.radius_km * 1000.0,
        lat = query.latitude,
        lng = query.longitude,
    );

    let filters = overpass_tag_filters();
    let mut lines = Vec::with_capacity(filters.len() * 3);
    for (key, value) in filters {
        let selector = build_tag_selector(key, value);
        for element_type in ["node", "way", "relation"] {
            lines.push(format!(
                "  {element_type}{selector}[\"wikidata\"]{around};"
            ));
        }
    }

    Ok(format!(
        "[out:json][timeout:{query_timeout_seconds}];\n(\n{query_lines}\n);\nout center tags;",
        query_lines = lines.join("\n")
    ))
}

fn validate_query(query: &PoiQuery) -> Result<(), PoiSourceError> {
    let PoiQuery {
        latitude,
        longitude,
        radius_km,
    } = *query;
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(PoiSourceError::invalid_request(
            "latitude must be finite and within [-90, 90]",
        ));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(PoiSourceError::invalid_request(
            "longitude must be finite and within [-180, 180]",
        ));
    }
    if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > MAX_RADIUS_KM {
        return Err(PoiSourceError::invalid_request(format!(
            "radius must be finite and within (0, {MAX_RADIUS_KM}] km"
        )));
    }
    Ok(())
}

fn build_tag_selector(key: &str, value: Option<&str>) -> String {
    let escaped_key = escape_quoted(key);
    match value {
        Some(value) => format!("[\"{escaped_key}\"=\"{}\"]", escape_quoted(value)),
        None => format!("[\"{escaped_key}\"]"),
    }
}

fn escape_quoted(raw: &str) -> String {
    raw.replace('\\', r"\\").replace('"', "\\\"")
}

fn map_transport_error(error: reqwest::Error) -> PoiSourceError {
    if error.is_timeout() {
        PoiSourceError::timeout(error.to_string())
    } else {
        PoiSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PoiSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => PoiSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PoiSourceError::timeout(message)
        }
        _ if status.is_client_error() => PoiSourceError::invalid_request(message),
        _ => PoiSourceError::transport(message),
    }
}
