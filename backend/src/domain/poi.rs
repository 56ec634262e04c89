//! POI shapes flowing through an import: raw OSM elements, upsert records,
//! and the stored rows read back for script generation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::enrichment::{EnrichmentRecord, NarrativeContent, WikidataId};

/// OSM element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmElementType {
    Node,
    Way,
    Relation,
}

impl OsmElementType {
    /// Single-letter prefix used in composite external ids.
    pub const fn prefix(self) -> char {
        match self {
            Self::Node => 'N',
            Self::Way => 'W',
            Self::Relation => 'R',
        }
    }
}

impl FromStr for OsmElementType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "node" => Ok(Self::Node),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            other => Err(format!("unsupported OSM element type: {other}")),
        }
    }
}

/// Composite source identifier, e.g. `N12345`.
///
/// # Examples
/// ```
/// use backend::domain::{ExternalId, OsmElementType};
///
/// let id = ExternalId::from_osm(OsmElementType::Way, 98);
/// assert_eq!(id.as_str(), "W98");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    /// Build the composite id for an OSM element.
    pub fn from_osm(element_type: OsmElementType, element_id: i64) -> Self {
        Self(format!("{}{element_id}", element_type.prefix()))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named OSM element inside an import zone.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoi {
    pub external_id: ExternalId,
    pub element_type: OsmElementType,
    pub name: String,
    /// Latitude in WGS84.
    pub latitude: f64,
    /// Longitude in WGS84.
    pub longitude: f64,
    pub tags: BTreeMap<String, String>,
    pub wikidata_id: Option<WikidataId>,
    /// Raw `wikipedia` tag in `lang:Title` form.
    pub wikipedia: Option<String>,
}

impl RawPoi {
    /// Category assigned by the tag rule table.
    pub fn category(&self) -> Category {
        Category::from_tags(&self.tags)
    }

    /// Article URL derived from the `wikipedia` tag, when well formed.
    pub fn wikipedia_tag_url(&self) -> Option<String> {
        let (language, title) = self.wikipedia.as_deref()?.split_once(':')?;
        let (language, title) = (language.trim(), title.trim());
        if language.is_empty() || title.is_empty() {
            return None;
        }
        Some(format!(
            "https://{language}.wikipedia.org/wiki/{}",
            title.replace(' ', "_")
        ))
    }
}

/// Enriched POI ready to be written by the persistence gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiUpsertRecord {
    /// De-duplication key; `None` means always insert.
    pub external_id: Option<String>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Category,
    /// Short description from the knowledge base.
    pub description: Option<String>,
    /// Full narrative text, kept apart from `description`.
    pub source_text: Option<String>,
    pub image_url: Option<String>,
    pub wikipedia_url: Option<String>,
    pub wikidata_id: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl PoiUpsertRecord {
    /// Merge a raw POI with whatever enrichment was resolved for it.
    pub fn from_parts(
        raw: &RawPoi,
        metadata: Option<&EnrichmentRecord>,
        content: Option<&NarrativeContent>,
    ) -> Self {
        let metadata = metadata.cloned().unwrap_or_default();
        let description = metadata
            .description
            .or_else(|| content.map(|found| found.extract.clone()))
            .filter(|text| !text.trim().is_empty());
        let wikipedia_url = metadata
            .wikipedia_url
            .or_else(|| content.map(|found| found.source_url.clone()))
            .or_else(|| raw.wikipedia_tag_url());

        Self {
            external_id: Some(raw.external_id.to_string()),
            name: raw.name.trim().to_owned(),
            latitude: raw.latitude,
            longitude: raw.longitude,
            category: raw.category(),
            description,
            source_text: content
                .map(|found| found.content.clone())
                .filter(|text| !text.trim().is_empty()),
            image_url: metadata.image_url,
            wikipedia_url,
            wikidata_id: raw.wikidata_id.as_ref().map(ToString::to_string),
            tags: raw.tags.clone(),
        }
    }
}

/// Persisted POI as read back for script generation.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoi {
    pub id: Uuid,
    pub zone_id: Option<Uuid>,
    pub external_id: Option<String>,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub source_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_poi() -> RawPoi {
        RawPoi {
            external_id: ExternalId::from_osm(OsmElementType::Node, 12345),
            element_type: OsmElementType::Node,
            name: " Tour Eiffel ".to_owned(),
            latitude: 48.8584,
            longitude: 2.2945,
            tags: BTreeMap::from([("man_made".to_owned(), "tower".to_owned())]),
            wikidata_id: "Q243".parse().ok(),
            wikipedia: Some("fr:Tour Eiffel".to_owned()),
        }
    }

    fn narrative() -> NarrativeContent {
        NarrativeContent {
            title: "Tour Eiffel".to_owned(),
            extract: "Tour en fer puddle.".to_owned(),
            content: "La tour Eiffel est une tour de fer puddle.".to_owned(),
            source_url: "https://fr.wikipedia.org/wiki/Tour_Eiffel".to_owned(),
            language: "fr".to_owned(),
        }
    }

    #[test]
    fn external_ids_use_type_prefix() {
        assert_eq!(ExternalId::from_osm(OsmElementType::Node, 1).as_str(), "N1");
        assert_eq!(
            ExternalId::from_osm(OsmElementType::Relation, 7).as_str(),
            "R7"
        );
    }

    #[test]
    fn wikipedia_tag_becomes_article_url() {
        assert_eq!(
            raw_poi().wikipedia_tag_url().as_deref(),
            Some("https://fr.wikipedia.org/wiki/Tour_Eiffel")
        );
    }

    #[test]
    fn upsert_record_keeps_description_and_source_text_apart() {
        let metadata = EnrichmentRecord {
            description: Some("tour de fer".to_owned()),
            image_url: Some("https://img/eiffel.jpg".to_owned()),
            wikipedia_url: None,
        };
        let record = PoiUpsertRecord::from_parts(&raw_poi(), Some(&metadata), Some(&narrative()));

        assert_eq!(record.external_id.as_deref(), Some("N12345"));
        assert_eq!(record.name, "Tour Eiffel");
        assert_eq!(record.category, Category::Insolite);
        assert_eq!(record.description.as_deref(), Some("tour de fer"));
        assert_eq!(
            record.source_text.as_deref(),
            Some("La tour Eiffel est une tour de fer puddle.")
        );
        assert_eq!(
            record.wikipedia_url.as_deref(),
            Some("https://fr.wikipedia.org/wiki/Tour_Eiffel")
        );
        assert_eq!(record.wikidata_id.as_deref(), Some("Q243"));
    }

    #[test]
    fn upsert_record_without_enrichment_has_null_fields() {
        let mut raw = raw_poi();
        raw.wikipedia = None;
        let record = PoiUpsertRecord::from_parts(&raw, None, None);

        assert!(record.description.is_none());
        assert!(record.source_text.is_none());
        assert!(record.image_url.is_none());
        assert!(record.wikipedia_url.is_none());
    }
}
