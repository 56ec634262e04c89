//! Reqwest-backed Wikidata knowledge-base adapter.
//!
//! Metadata comes from one SPARQL query per batch; article titles come from
//! the `wbgetentities` sitelinks of a single entity. Both calls share one
//! rate limiter.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{EntitiesResponseDto, SparqlResponseDto};
use crate::domain::ports::{KnowledgeBaseError, KnowledgeBaseSource};
use crate::domain::{EnrichmentRecord, WikidataId};
use crate::outbound::http_support::{body_preview, build_client};
use crate::outbound::rate_limiter::RateLimiter;

/// Endpoints and language used by [`WikidataHttpSource`].
#[derive(Debug, Clone)]
pub struct WikidataEndpoints {
    /// SPARQL query service, e.g. `https://query.wikidata.org/sparql`.
    pub sparql: Url,
    /// Action API, e.g. `https://www.wikidata.org/w/api.php`.
    pub api: Url,
    /// Language of descriptions and of the linked article.
    pub language: String,
}

/// Knowledge-base adapter talking to Wikidata over HTTP.
pub struct WikidataHttpSource {
    client: Client,
    endpoints: WikidataEndpoints,
    limiter: Arc<RateLimiter>,
}

impl WikidataHttpSource {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoints: WikidataEndpoints,
        timeout: Duration,
        user_agent: &str,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout, user_agent)?,
            endpoints,
            limiter,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, KnowledgeBaseError> {
        self.limiter.acquire().await;
        debug!(%url, "querying wikidata");
        let response = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/sparql-results+json, application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            KnowledgeBaseError::decode(format!("invalid Wikidata JSON payload: {error}"))
        })
    }
}

#[async_trait]
impl KnowledgeBaseSource for WikidataHttpSource {
    async fn fetch_entities(
        &self,
        ids: &[WikidataId],
    ) -> Result<HashMap<WikidataId, EnrichmentRecord>, KnowledgeBaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sparql = build_sparql_query(ids, &self.endpoints.language);
        let decoded: SparqlResponseDto = self
            .get_json(
                self.endpoints.sparql.clone(),
                &[("query", sparql.as_str()), ("format", "json")],
            )
            .await?;
        Ok(decoded.into_records())
    }

    async fn article_titles(
        &self,
        id: &WikidataId,
    ) -> Result<BTreeMap<String, String>, KnowledgeBaseError> {
        let decoded: EntitiesResponseDto = self
            .get_json(
                self.endpoints.api.clone(),
                &[
                    ("action", "wbgetentities"),
                    ("ids", id.as_str()),
                    ("props", "sitelinks"),
                    ("format", "json"),
                ],
            )
            .await?;
        Ok(decoded.into_titles(id))
    }
}

fn build_sparql_query(ids: &[WikidataId], language: &str) -> String {
    let values = ids
        .iter()
        .map(|id| format!("wd:{id}"))
        .collect::<Vec<_>>()
        .join(" ");
    let language = sanitize_language(language);
    format!(
        "SELECT ?item ?description ?image ?article WHERE {{\n\
         \x20 VALUES ?item {{ {values} }}\n\
         \x20 OPTIONAL {{ ?item schema:description ?description . \
         FILTER(LANG(?description) = \"{language}\") }}\n\
         \x20 OPTIONAL {{ ?item wdt:P18 ?image . }}\n\
         \x20 OPTIONAL {{ ?article schema:about ?item ; \
         schema:isPartOf <https://{language}.wikipedia.org/> . }}\n\
         }}"
    )
}

fn sanitize_language(language: &str) -> String {
    let cleaned: String = language
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() {
        "en".to_owned()
    } else {
        cleaned
    }
}

fn map_transport_error(error: reqwest::Error) -> KnowledgeBaseError {
    if error.is_timeout() {
        KnowledgeBaseError::timeout(error.to_string())
    } else {
        KnowledgeBaseError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> KnowledgeBaseError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::TOO_MANY_REQUESTS => KnowledgeBaseError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            KnowledgeBaseError::timeout(message)
        }
        _ => KnowledgeBaseError::transport(message),
    }
}
