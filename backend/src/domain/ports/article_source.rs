//! Driven port for encyclopedia article bodies (Wikipedia).

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ArticleRef, NarrativeContent};

define_port_error! {
    /// Errors raised while fetching article content.
    pub enum ArticleSourceError {
        /// Network transport failed before a response arrived.
        Transport => "article source transport failed",
        /// The call exceeded its timeout.
        Timeout => "article source timeout",
        /// The service rejected the call as over quota.
        RateLimited => "article source rate limited request",
        /// The response body could not be decoded.
        Decode => "article source response decode failed",
    }
}

/// Port for fetching plain-text article content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch and clean one article; `Ok(None)` when the article does not exist.
    async fn fetch_article(
        &self,
        article: &ArticleRef,
    ) -> Result<Option<NarrativeContent>, ArticleSourceError>;
}

/// Fixture source with no articles.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureArticleSource;

#[async_trait]
impl ArticleSource for FixtureArticleSource {
    async fn fetch_article(
        &self,
        _article: &ArticleRef,
    ) -> Result<Option<NarrativeContent>, ArticleSourceError> {
        Ok(None)
    }
}
