//! Reqwest-backed Wikipedia article adapter.
//!
//! Articles are read from the REST `mobile-sections` endpoint; when that
//! yields no body the `summary` endpoint supplies at least the lead extract.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{MobileSectionsDto, SummaryDto};
use super::html_text::html_to_text;
use crate::domain::ports::{ArticleSource, ArticleSourceError};
use crate::domain::{ArticleRef, NarrativeContent};
use crate::outbound::http_support::{body_preview, build_client};
use crate::outbound::rate_limiter::RateLimiter;

/// REST base URL; `{lang}` is replaced by the article language.
pub const DEFAULT_REST_URL_TEMPLATE: &str = "https://{lang}.wikipedia.org/api/rest_v1";

/// Article adapter talking to the Wikipedia REST API.
pub struct WikipediaHttpSource {
    client: Client,
    rest_url_template: String,
    limiter: Arc<RateLimiter>,
}

impl WikipediaHttpSource {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        rest_url_template: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout, user_agent)?,
            rest_url_template: rest_url_template.into(),
            limiter,
        })
    }

    fn page_url(&self, article: &ArticleRef, endpoint: &str) -> Result<Url, ArticleSourceError> {
        page_url(&self.rest_url_template, article, endpoint)
    }

    /// GET a JSON document; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, ArticleSourceError> {
        self.limiter.acquire().await;
        debug!(%url, "fetching wikipedia page");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref())
            .map(Some)
            .map_err(|error| {
                ArticleSourceError::decode(format!("invalid Wikipedia JSON payload: {error}"))
            })
    }
}

#[async_trait]
impl ArticleSource for WikipediaHttpSource {
    async fn fetch_article(
        &self,
        article: &ArticleRef,
    ) -> Result<Option<NarrativeContent>, ArticleSourceError> {
        let source_url = article_url(article);
        let sections: Option<MobileSectionsDto> = self
            .get_json(self.page_url(article, "mobile-sections")?)
            .await?;
        if let Some(text) = sections.and_then(MobileSectionsDto::into_text) {
            return Ok(Some(NarrativeContent {
                title: text.title.unwrap_or_else(|| article.title.clone()),
                extract: text.extract,
                content: text.content,
                source_url,
                language: article.language.clone(),
            }));
        }

        debug!(title = %article.title, "no sections; falling back to summary");
        let summary: Option<SummaryDto> =
            self.get_json(self.page_url(article, "summary")?).await?;
        Ok(summary.and_then(|summary| {
            let extract = html_to_text(&summary.extract);
            if extract.is_empty() {
                return None;
            }
            let source_url = summary.page_url().map_or(source_url, str::to_owned);
            Some(NarrativeContent {
                title: summary.title.unwrap_or_else(|| article.title.clone()),
                content: extract.clone(),
                extract,
                source_url,
                language: article.language.clone(),
            })
        }))
    }
}

fn page_url(
    template: &str,
    article: &ArticleRef,
    endpoint: &str,
) -> Result<Url, ArticleSourceError> {
    let base = template.replace("{lang}", article.language.trim());
    let title = wiki_title(&article.title);
    let mut url = Url::parse(&base).map_err(|error| {
        ArticleSourceError::transport(format!("invalid Wikipedia base URL {base}: {error}"))
    })?;
    url.path_segments_mut()
        .map_err(|()| ArticleSourceError::transport(format!("Wikipedia URL {base} cannot be a base")))?
        .pop_if_empty()
        .extend(["page", endpoint, title.as_str()]);
    Ok(url)
}

fn wiki_title(title: &str) -> String {
    title.trim().replace(' ', "_")
}

fn article_url(article: &ArticleRef) -> String {
    format!(
        "https://{}.wikipedia.org/wiki/{}",
        article.language.trim(),
        wiki_title(&article.title)
    )
}

fn map_transport_error(error: reqwest::Error) -> ArticleSourceError {
    if error.is_timeout() {
        ArticleSourceError::timeout(error.to_string())
    } else {
        ArticleSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ArticleSourceError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::TOO_MANY_REQUESTS => ArticleSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ArticleSourceError::timeout(message)
        }
        _ => ArticleSourceError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> ArticleRef {
        ArticleRef {
            title: title.to_owned(),
            language: "fr".to_owned(),
        }
    }

    #[test]
    fn builds_encoded_page_urls_from_template() {
        let url = page_url(
            DEFAULT_REST_URL_TEMPLATE,
            &article("Cathédrale Saint-Pierre"),
            "mobile-sections",
        )
        .expect("url builds");

        assert_eq!(url.host_str(), Some("fr.wikipedia.org"));
        assert_eq!(
            url.path(),
            "/api/rest_v1/page/mobile-sections/Cath%C3%A9drale_Saint-Pierre"
        );
    }

    #[test]
    fn slashes_in_titles_stay_in_one_segment() {
        let url = page_url(DEFAULT_REST_URL_TEMPLATE, &article("AC/DC"), "summary")
            .expect("url builds");
        assert!(url.path().ends_with("/page/summary/AC%2FDC"));
    }

    #[test]
    fn invalid_template_is_reported() {
        let error = page_url("not a url", &article("X"), "summary").expect_err("invalid");
        assert!(matches!(error, ArticleSourceError::Transport { .. }));
    }

    #[test]
    fn canonical_article_url_uses_underscores() {
        assert_eq!(
            article_url(&article("Tour Eiffel")),
            "https://fr.wikipedia.org/wiki/Tour_Eiffel"
        );
    }
}
