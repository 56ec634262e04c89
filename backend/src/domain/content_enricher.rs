//! Narrative content enrichment from encyclopedia articles.
//!
//! Resolution runs in two phases per entity: pick an article title by walking
//! the language preference list, then fetch that article as plain text. Both
//! phases are cached per `id:lang`. When the preferred language finds no title,
//! the title lookup is retried once in English.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ports::{
    ArticleSource, ArticleSourceError, EnrichmentCache, KnowledgeBaseError, KnowledgeBaseSource,
    language_cache_key,
};
use super::{ArticleRef, NarrativeContent, WikidataId};

/// Language tried after the preferred one, in order.
pub const LANGUAGE_FALLBACK_CHAIN: [&str; 4] = ["en", "de", "es", "it"];

const RETRY_LANGUAGE: &str = "en";

/// Failure resolving content for a single entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentEnrichmentError {
    #[error("article title lookup failed: {0}")]
    Titles(#[from] KnowledgeBaseError),
    #[error("article fetch failed: {0}")]
    Article(#[from] ArticleSourceError),
}

/// Cache of phase-one results; `None` records a known miss.
pub type TitleCache = dyn EnrichmentCache<Option<ArticleRef>>;
/// Cache of phase-two results; `None` records a missing article.
pub type ArticleCache = dyn EnrichmentCache<Option<NarrativeContent>>;

/// Service resolving long-form narrative text per entity.
#[derive(Clone)]
pub struct ContentEnricher {
    knowledge_base: Arc<dyn KnowledgeBaseSource>,
    articles: Arc<dyn ArticleSource>,
    titles: Arc<TitleCache>,
    contents: Arc<ArticleCache>,
}

/// Ordered, de-duplicated languages to try for `preferred`.
///
/// # Examples
/// ```
/// use backend::domain::language_preference;
///
/// assert_eq!(language_preference("fr"), ["fr", "en", "de", "es", "it"]);
/// assert_eq!(language_preference("de"), ["de", "en", "es", "it"]);
/// ```
pub fn language_preference(preferred: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(preferred.trim().to_ascii_lowercase())
        .chain(LANGUAGE_FALLBACK_CHAIN.iter().map(|lang| (*lang).to_owned()))
        .filter(|lang| !lang.is_empty() && seen.insert(lang.clone()))
        .collect()
}

impl ContentEnricher {
    /// Build an enricher over the given sources and caches.
    pub fn new(
        knowledge_base: Arc<dyn KnowledgeBaseSource>,
        articles: Arc<dyn ArticleSource>,
        titles: Arc<TitleCache>,
        contents: Arc<ArticleCache>,
    ) -> Self {
        Self {
            knowledge_base,
            articles,
            titles,
            contents,
        }
    }

    /// Resolve content for every id; failures are logged and omitted.
    ///
    /// `on_progress(processed, total)` runs after each id.
    pub async fn enrich<F>(
        &self,
        ids: &[WikidataId],
        language: &str,
        mut on_progress: F,
    ) -> HashMap<WikidataId, NarrativeContent>
    where
        F: FnMut(usize, usize) + Send,
    {
        let mut seen = HashSet::new();
        let unique: Vec<&WikidataId> = ids.iter().filter(|id| seen.insert(*id)).collect();
        let total = unique.len();
        let mut results = HashMap::with_capacity(total);

        for (index, id) in unique.into_iter().enumerate() {
            match self.resolve(id, language).await {
                Ok(Some(content)) => {
                    results.insert(id.clone(), content);
                }
                Ok(None) => debug!(wikidata_id = %id, "no article found"),
                Err(error) => warn!(wikidata_id = %id, %error, "content enrichment failed"),
            }
            on_progress(index + 1, total);
        }

        info!(
            enriched = results.len(),
            total,
            "{} of {} enriched",
            results.len(),
            total
        );
        results
    }

    /// Resolve content for one entity.
    ///
    /// Only the title lookup is retried in English, once, when the preferred
    /// language yields no title or the lookup fails. A missing article for a
    /// resolved title is final.
    pub async fn resolve(
        &self,
        id: &WikidataId,
        language: &str,
    ) -> Result<Option<NarrativeContent>, ContentEnrichmentError> {
        let Some(article) = self.resolve_title_with_retry(id, language).await? else {
            return Ok(None);
        };
        self.fetch_content(id, &article).await
    }

    async fn resolve_title_with_retry(
        &self,
        id: &WikidataId,
        language: &str,
    ) -> Result<Option<ArticleRef>, ContentEnrichmentError> {
        let first = self.resolve_title(id, language).await;
        if matches!(first, Ok(Some(_))) || language.trim().eq_ignore_ascii_case(RETRY_LANGUAGE) {
            return first;
        }
        if let Err(error) = &first {
            debug!(wikidata_id = %id, %error, "title lookup failed; retrying in English");
        }
        self.resolve_title(id, RETRY_LANGUAGE).await
    }

    async fn resolve_title(
        &self,
        id: &WikidataId,
        language: &str,
    ) -> Result<Option<ArticleRef>, ContentEnrichmentError> {
        let key = language_cache_key(id.as_str(), &language.trim().to_ascii_lowercase());
        if let Some(cached) = self.titles.get(&key) {
            return Ok(cached);
        }

        let titles = self.knowledge_base.article_titles(id).await?;
        let found = language_preference(language)
            .into_iter()
            .find_map(|lang| {
                titles
                    .get(&lang)
                    .filter(|title| !title.trim().is_empty())
                    .map(|title| ArticleRef {
                        title: title.clone(),
                        language: lang,
                    })
            });
        self.titles.put(&key, found.clone());
        Ok(found)
    }

    async fn fetch_content(
        &self,
        id: &WikidataId,
        article: &ArticleRef,
    ) -> Result<Option<NarrativeContent>, ContentEnrichmentError> {
        let key = language_cache_key(id.as_str(), &article.language);
        if let Some(cached) = self.contents.get(&key) {
            return Ok(cached);
        }

        let content = self.articles.fetch_article(article).await?;
        self.contents.put(&key, content.clone());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{MockArticleSource, MockKnowledgeBaseSource};
    use crate::outbound::cache::InMemoryEnrichmentCache;

    fn id(raw: &str) -> WikidataId {
        raw.parse().expect("valid id")
    }

    fn titles(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(lang, title)| ((*lang).to_owned(), (*title).to_owned()))
            .collect()
    }

    fn content_for(article: &ArticleRef) -> NarrativeContent {
        NarrativeContent {
            title: article.title.clone(),
            extract: format!("{} extract", article.title),
            content: format!("{} body", article.title),
            source_url: format!(
                "https://{}.wikipedia.org/wiki/{}",
                article.language, article.title
            ),
            language: article.language.clone(),
        }
    }

    struct Caches {
        titles: Arc<InMemoryEnrichmentCache<Option<ArticleRef>>>,
        contents: Arc<InMemoryEnrichmentCache<Option<NarrativeContent>>>,
    }

    #[fixture]
    fn caches() -> Caches {
        Caches {
            titles: Arc::new(InMemoryEnrichmentCache::new()),
            contents: Arc::new(InMemoryEnrichmentCache::new()),
        }
    }

    fn enricher(
        knowledge_base: MockKnowledgeBaseSource,
        articles: MockArticleSource,
        caches: &Caches,
    ) -> ContentEnricher {
        ContentEnricher::new(
            Arc::new(knowledge_base),
            Arc::new(articles),
            caches.titles.clone(),
            caches.contents.clone(),
        )
    }

    fn echo_articles() -> MockArticleSource {
        let mut articles = MockArticleSource::new();
        articles
            .expect_fetch_article()
            .returning(|article| Ok(Some(content_for(article))));
        articles
    }

    #[rstest]
    #[case::preferred_available(&[("fr", "Tour"), ("en", "Tower")], "fr", "fr")]
    #[case::falls_back_to_english(&[("de", "Turm"), ("en", "Tower")], "fr", "en")]
    #[case::falls_back_to_german(&[("it", "Torre"), ("de", "Turm")], "fr", "de")]
    #[case::italian_last(&[("it", "Torre"), ("ja", "塔")], "fr", "it")]
    #[tokio::test]
    async fn walks_language_preference_order(
        caches: Caches,
        #[case] available: &[(&str, &str)],
        #[case] preferred: &str,
        #[case] expected_language: &str,
    ) {
        let available = titles(available);
        let mut knowledge_base = MockKnowledgeBaseSource::new();
        knowledge_base
            .expect_article_titles()
            .returning(move |_| Ok(available.clone()));
        let enricher = enricher(knowledge_base, echo_articles(), &caches);

        let content = enricher
            .resolve(&id("Q1"), preferred)
            .await
            .expect("resolution succeeds")
            .expect("article found");

        assert_eq!(content.language, expected_language);
    }

    #[rstest]
    #[tokio::test]
    async fn retries_once_in_english_after_title_lookup_failure(caches: Caches) {
        let mut knowledge_base = MockKnowledgeBaseSource::new();
        let mut sequence = mockall::Sequence::new();
        knowledge_base
            .expect_article_titles()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Err(KnowledgeBaseError::timeout("sitelinks slow")));
        knowledge_base
            .expect_article_titles()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(titles(&[("en", "Tower")])));
        let enricher = enricher(knowledge_base, echo_articles(), &caches);

        let content = enricher
            .resolve(&id("Q1"), "fr")
            .await
            .expect("retry succeeds");

        assert_eq!(content.map(|found| found.language).as_deref(), Some("en"));
    }

    #[rstest]
    #[tokio::test]
    async fn english_preference_is_not_retried(caches: Caches) {
        let mut knowledge_base = MockKnowledgeBaseSource::new();
        knowledge_base
            .expect_article_titles()
            .times(1)
            .returning(|_| Err(KnowledgeBaseError::transport("refused")));
        let enricher = enricher(knowledge_base, MockArticleSource::new(), &caches);

        let result = enricher.resolve(&id("Q1"), "en").await;

        assert!(matches!(result, Err(ContentEnrichmentError::Titles(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn no_cross_reference_resolves_to_none_after_single_retry(caches: Caches) {
        let mut knowledge_base = MockKnowledgeBaseSource::new();
        knowledge_base
            .expect_article_titles()
            .times(2)
            .returning(|_| Ok(BTreeMap::new()));
        let enricher = enricher(knowledge_base, MockArticleSource::new(), &caches);

        let result = enricher.resolve(&id("Q1"), "fr").await;

        assert_eq!(result, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_article_for_resolved_title_is_not_retried(caches: Caches) {
        let mut knowledge_base = MockKnowledgeBaseSource::new();
        knowledge_base
            .expect_article_titles()
            .times(1)
            .returning(|_| Ok(titles(&[("fr", "Tour"), ("en", "Tower")])));
        let mut articles = MockArticleSource::new();
        articles
            .expect_fetch_article()
            .times(1)
            .withf(|article| article.language == "fr" && article.title == "Tour")
            .returning(|_| Ok(None));
        let enricher = enricher(knowledge_base, articles, &caches);

        let result = enricher.resolve(&id("Q1"), "fr").await;

        assert_eq!(result, Ok(None));
        assert_eq!(caches.contents.get("Q1:fr"), Some(None));
        assert!(caches.contents.get("Q1:en").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn both_phases_are_cached_per_language(caches: Caches) {
        let mut knowledge_base = MockKnowledgeBaseSource::new();
        knowledge_base
            .expect_article_titles()
            .times(1)
            .returning(|_| Ok(titles(&[("fr", "Tour")])));
        let mut articles = MockArticleSource::new();
        articles
            .expect_fetch_article()
            .times(1)
            .returning(|article| Ok(Some(content_for(article))));
        let enricher = enricher(knowledge_base, articles, &caches);

        let first = enricher.resolve(&id("Q1"), "fr").await;
        let second = enricher.resolve(&id("Q1"), "fr").await;

        assert_eq!(first, second);
        assert!(caches.titles.get("Q1:fr").is_some());
        assert!(caches.contents.get("Q1:fr").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn per_id_failures_are_isolated(caches: Caches) {
        let mut knowledge_base = MockKnowledgeBaseSource::new();
        knowledge_base
            .expect_article_titles()
            .returning(|entity| Ok(titles(&[("en", entity.as_str())])));
        let mut articles = MockArticleSource::new();
        articles.expect_fetch_article().returning(|article| {
            if article.title == "Q2" {
                Err(ArticleSourceError::transport("reset"))
            } else {
                Ok(Some(content_for(article)))
            }
        });
        let enricher = enricher(knowledge_base, articles, &caches);
        let progress = Mutex::new(Vec::new());

        let results = enricher
            .enrich(&[id("Q1"), id("Q2"), id("Q3"), id("Q1")], "en", |done, total| {
                progress.lock().expect("progress lock").push((done, total));
            })
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.contains_key(&id("Q1")));
        assert!(!results.contains_key(&id("Q2")));
        assert_eq!(
            progress.into_inner().expect("progress lock"),
            vec![(1, 3), (2, 3), (3, 3)]
        );
    }

    #[test]
    fn preference_list_deduplicates_and_normalizes() {
        assert_eq!(language_preference(" EN "), ["en", "de", "es", "it"]);
        assert_eq!(language_preference(""), ["en", "de", "es", "it"]);
    }
}
