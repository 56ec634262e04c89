//! DTOs for decoding Overpass JSON responses.
//!
//! Elements are decoded leniently, then filtered and mapped into [`RawPoi`]
//! in one pass. Elements the import cannot use are skipped, not rejected.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use crate::domain::{ExternalId, OsmElementType, RawPoi, WikidataId};

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: String,
    pub(super) id: i64,
    pub(super) lon: Option<f64>,
    pub(super) lat: Option<f64>,
    pub(super) center: Option<OverpassElementCenterDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementCenterDto {
    pub(super) lon: f64,
    pub(super) lat: f64,
}

impl OverpassResponseDto {
    /// Named, cross-referenced POIs, first occurrence kept per external id.
    pub(super) fn into_raw_pois(self) -> Vec<RawPoi> {
        let mut seen = HashSet::new();
        self.elements
            .into_iter()
            .filter_map(OverpassElementDto::into_raw_poi)
            .filter(|poi| seen.insert(poi.external_id.clone()))
            .collect()
    }
}

impl OverpassElementDto {
    fn into_raw_poi(self) -> Option<RawPoi> {
        let element_type: OsmElementType = self.element_type.parse().ok()?;
        let (longitude, latitude) = self.coordinates()?;
        if !longitude.is_finite() || !latitude.is_finite() {
            debug!(id = self.id, "skipping element with non-finite coordinates");
            return None;
        }
        let name = self
            .tags
            .get("name")
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())?;
        let wikidata_id = self
            .tags
            .get("wikidata")
            .and_then(|raw| raw.parse::<WikidataId>().ok())?;
        let wikipedia = self.tags.get("wikipedia").cloned();

        Some(RawPoi {
            external_id: ExternalId::from_osm(element_type, self.id),
            element_type,
            name,
            latitude,
            longitude,
            tags: self.tags,
            wikidata_id: Some(wikidata_id),
            wikipedia,
        })
    }

    fn coordinates(&self) -> Option<(f64, f64)> {
        if let (Some(longitude), Some(latitude)) = (self.lon, self.lat) {
            return Some((longitude, latitude));
        }
        self.center.as_ref().map(|center| (center.lon, center.lat))
    }
}
