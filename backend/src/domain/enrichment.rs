//! Knowledge-base identifiers and the enrichment payloads keyed by them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Normalized Wikidata entity identifier such as `Q42`.
///
/// ## Invariants
/// - Always an uppercase `Q` followed by one or more ASCII digits.
///
/// # Examples
/// ```
/// use backend::domain::WikidataId;
///
/// let id: WikidataId = " q42 ".parse().expect("valid id");
/// assert_eq!(id.as_str(), "Q42");
/// assert_eq!("42".parse::<WikidataId>().expect("valid id").as_str(), "Q42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WikidataId(String);

/// Rejection reason for malformed Wikidata identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wikidata id: {0:?}")]
pub struct InvalidWikidataId(pub String);

impl WikidataId {
    /// Borrow the normalized identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Entity URI used by the SPARQL endpoint.
    pub fn entity_uri(&self) -> String {
        format!("http://www.wikidata.org/entity/{}", self.0)
    }
}

impl FromStr for WikidataId {
    type Err = InvalidWikidataId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let upper = trimmed.to_ascii_uppercase();
        let digits = upper.strip_prefix('Q').unwrap_or(upper.as_str());
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(InvalidWikidataId(raw.to_owned()));
        }
        Ok(Self(format!("Q{digits}")))
    }
}

impl AsRef<str> for WikidataId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for WikidataId {
    type Error = InvalidWikidataId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WikidataId> for String {
    fn from(value: WikidataId) -> Self {
        value.0
    }
}

impl fmt::Display for WikidataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured metadata resolved from the knowledge base.
///
/// Every field is optional: an entity with nothing known is still represented
/// by an all-`None` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub wikipedia_url: Option<String>,
}

impl EnrichmentRecord {
    /// Fold `newer` into `self`, never replacing a known value with `None`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EnrichmentRecord;
    ///
    /// let mut cached = EnrichmentRecord {
    ///     description: Some("Gothic cathedral".to_owned()),
    ///     ..EnrichmentRecord::default()
    /// };
    /// cached.merge_non_null(EnrichmentRecord {
    ///     image_url: Some("https://img/1.jpg".to_owned()),
    ///     ..EnrichmentRecord::default()
    /// });
    /// assert_eq!(cached.description.as_deref(), Some("Gothic cathedral"));
    /// assert!(cached.image_url.is_some());
    /// ```
    pub fn merge_non_null(&mut self, newer: Self) {
        let Self {
            description,
            image_url,
            wikipedia_url,
        } = newer;
        if description.is_some() {
            self.description = description;
        }
        if image_url.is_some() {
            self.image_url = image_url;
        }
        if wikipedia_url.is_some() {
            self.wikipedia_url = wikipedia_url;
        }
    }

    /// Whether no field has been resolved.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.image_url.is_none() && self.wikipedia_url.is_none()
    }
}

/// Article title resolved for one language edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub title: String,
    pub language: String,
}

/// Long-form narrative text fetched from an encyclopedia article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeContent {
    pub title: String,
    /// Short lead paragraph.
    pub extract: String,
    /// Full article body as plain text.
    pub content: String,
    pub source_url: String,
    pub language: String,
}

/// Merge policy for cached values.
pub trait MergeNonNull {
    /// Fold `newer` into `self` without discarding known values.
    fn merge_non_null(&mut self, newer: Self);
}

impl MergeNonNull for EnrichmentRecord {
    fn merge_non_null(&mut self, newer: Self) {
        Self::merge_non_null(self, newer);
    }
}

impl MergeNonNull for NarrativeContent {
    fn merge_non_null(&mut self, newer: Self) {
        *self = newer;
    }
}

impl<T> MergeNonNull for Option<T> {
    fn merge_non_null(&mut self, newer: Self) {
        if newer.is_some() {
            *self = newer;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::canonical("Q42", "Q42")]
    #[case::lowercase("q42", "Q42")]
    #[case::bare_digits("42", "Q42")]
    #[case::padded("  Q7  ", "Q7")]
    fn normalizes_identifiers(#[case] raw: &str, #[case] expected: &str) {
        let id: WikidataId = raw.parse().expect("valid id");
        assert_eq!(id.as_str(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::prefix_only("Q")]
    #[case::property("P31")]
    #[case::url("https://www.wikidata.org/wiki/Q42")]
    fn rejects_malformed_identifiers(#[case] raw: &str) {
        assert!(raw.parse::<WikidataId>().is_err());
    }

    #[test]
    fn merge_keeps_existing_values_when_newer_is_null() {
        let mut cached = EnrichmentRecord {
            description: Some("old".to_owned()),
            image_url: Some("img".to_owned()),
            wikipedia_url: None,
        };
        cached.merge_non_null(EnrichmentRecord {
            description: None,
            image_url: Some("img2".to_owned()),
            wikipedia_url: Some("wiki".to_owned()),
        });
        assert_eq!(cached.description.as_deref(), Some("old"));
        assert_eq!(cached.image_url.as_deref(), Some("img2"));
        assert_eq!(cached.wikipedia_url.as_deref(), Some("wiki"));
    }

    #[test]
    fn option_merge_ignores_none() {
        let mut cached = Some(1);
        MergeNonNull::merge_non_null(&mut cached, None);
        assert_eq!(cached, Some(1));
    }
}
