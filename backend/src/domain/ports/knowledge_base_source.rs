//! Driven port for the structured knowledge base (Wikidata).

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{EnrichmentRecord, WikidataId};

define_port_error! {
    /// Errors raised by knowledge-base lookups.
    pub enum KnowledgeBaseError {
        /// Network transport failed before a response arrived.
        Transport => "knowledge base transport failed",
        /// The call exceeded its timeout.
        Timeout => "knowledge base timeout",
        /// The service rejected the call as over quota.
        RateLimited => "knowledge base rate limited request",
        /// The response body could not be decoded.
        Decode => "knowledge base response decode failed",
    }
}

/// Port for batch metadata and per-entity article cross-references.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KnowledgeBaseSource: Send + Sync {
    /// Resolve metadata for one batch of entities with a single query.
    ///
    /// Entities without any binding may be absent from the returned map.
    async fn fetch_entities(
        &self,
        ids: &[WikidataId],
    ) -> Result<HashMap<WikidataId, EnrichmentRecord>, KnowledgeBaseError>;

    /// Article titles for `id`, keyed by language code (`fr`, `en`, ...).
    async fn article_titles(
        &self,
        id: &WikidataId,
    ) -> Result<BTreeMap<String, String>, KnowledgeBaseError>;
}

/// Fixture source that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureKnowledgeBaseSource;

#[async_trait]
impl KnowledgeBaseSource for FixtureKnowledgeBaseSource {
    async fn fetch_entities(
        &self,
        _ids: &[WikidataId],
    ) -> Result<HashMap<WikidataId, EnrichmentRecord>, KnowledgeBaseError> {
        Ok(HashMap::new())
    }

    async fn article_titles(
        &self,
        _id: &WikidataId,
    ) -> Result<BTreeMap<String, String>, KnowledgeBaseError> {
        Ok(BTreeMap::new())
    }
}
