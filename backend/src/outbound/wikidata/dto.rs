//! DTOs for the Wikidata SPARQL and `wbgetentities` responses.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::domain::{EnrichmentRecord, WikidataId};

/// Sites ending in `wiki` that are not language editions.
const NON_LANGUAGE_WIKIS: &[&str] = &[
    "commons", "wikidata", "species", "meta", "mediawiki", "sources", "outreach", "incubator",
    "wikimania",
];

#[derive(Debug, Deserialize)]
pub(super) struct SparqlResponseDto {
    pub(super) results: SparqlResultsDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct SparqlResultsDto {
    #[serde(default)]
    pub(super) bindings: Vec<SparqlBindingDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SparqlBindingDto {
    pub(super) item: SparqlValueDto,
    pub(super) description: Option<SparqlValueDto>,
    pub(super) image: Option<SparqlValueDto>,
    pub(super) article: Option<SparqlValueDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SparqlValueDto {
    pub(super) value: String,
}

impl SparqlResponseDto {
    /// Fold bindings into one record per entity; the first value per field wins.
    pub(super) fn into_records(self) -> HashMap<WikidataId, EnrichmentRecord> {
        let mut records: HashMap<WikidataId, EnrichmentRecord> = HashMap::new();
        for binding in self.results.bindings {
            let Some(id) = entity_id(&binding.item.value) else {
                continue;
            };
            let record = records.entry(id).or_default();
            fill(&mut record.description, binding.description);
            fill(&mut record.image_url, binding.image);
            fill(&mut record.wikipedia_url, binding.article);
        }
        records
    }
}

fn fill(slot: &mut Option<String>, value: Option<SparqlValueDto>) {
    if slot.is_some() {
        return;
    }
    *slot = value
        .map(|value| value.value.trim().to_owned())
        .filter(|value| !value.is_empty());
}

fn entity_id(uri: &str) -> Option<WikidataId> {
    uri.rsplit('/').next()?.parse().ok()
}

#[derive(Debug, Deserialize)]
pub(super) struct EntitiesResponseDto {
    #[serde(default)]
    pub(super) entities: HashMap<String, EntityDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EntityDto {
    #[serde(default)]
    pub(super) sitelinks: HashMap<String, SitelinkDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SitelinkDto {
    pub(super) title: String,
}

impl EntitiesResponseDto {
    /// Language-edition titles for `id`, keyed by language code.
    pub(super) fn into_titles(mut self, id: &WikidataId) -> BTreeMap<String, String> {
        let Some(entity) = self.entities.remove(id.as_str()) else {
            return BTreeMap::new();
        };
        entity
            .sitelinks
            .into_iter()
            .filter_map(|(site, link)| {
                let language = site_language(&site)?;
                let title = link.title.trim();
                (!title.is_empty()).then(|| (language, title.to_owned()))
            })
            .collect()
    }
}

/// `frwiki` → `fr`, `zh_yuewiki` → `zh-yue`; non-Wikipedia sites → `None`.
fn site_language(site: &str) -> Option<String> {
    let code = site.strip_suffix("wiki")?;
    if code.is_empty() || NON_LANGUAGE_WIKIS.contains(&code) {
        return None;
    }
    Some(code.replace('_', "-"))
}
