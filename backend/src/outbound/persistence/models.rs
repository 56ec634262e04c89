//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{pois, zones};
use crate::domain::PoiUpsertRecord;
use crate::domain::ports::Zone;

/// Row struct for reading from the zones table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = zones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ZoneRow {
    pub id: Uuid,
    pub name: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_km: f64,
    pub last_import_at: Option<DateTime<Utc>>,
    pub poi_count: i64,
}

impl From<ZoneRow> for Zone {
    fn from(row: ZoneRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            center_lat: row.center_lat,
            center_lng: row.center_lng,
            radius_km: row.radius_km,
            last_import_at: row.last_import_at,
            poi_count: row.poi_count,
        }
    }
}

/// Columns read back when generating a script.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pois)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StoredPoiRow {
    pub id: Uuid,
    pub zone_id: Option<Uuid>,
    pub external_id: Option<String>,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub source_text: Option<String>,
}

/// Insertable struct for new POIs.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pois)]
pub(crate) struct NewPoiRow<'a> {
    pub zone_id: Uuid,
    pub external_id: Option<&'a str>,
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub category: &'a str,
    pub description: Option<&'a str>,
    pub source_text: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub wikipedia_url: Option<&'a str>,
    pub wikidata_id: Option<&'a str>,
    pub tags: &'a serde_json::Value,
}

/// Changeset applied when re-importing a known POI.
///
/// Zone, external id, and creation time never change after insertion.
/// `None` fields are skipped, so enrichment that failed on this run keeps the
/// previously stored value.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = pois)]
pub(crate) struct PoiRefreshChangeset<'a> {
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub category: &'a str,
    pub description: Option<&'a str>,
    pub source_text: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub wikipedia_url: Option<&'a str>,
    pub wikidata_id: Option<&'a str>,
    pub tags: &'a serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Borrowed view of one upsert record plus its serialized tags.
pub(crate) struct PreparedPoi<'a> {
    pub record: &'a PoiUpsertRecord,
    pub tags: serde_json::Value,
}

impl<'a> PreparedPoi<'a> {
    pub(crate) fn new_row(&'a self, zone_id: Uuid) -> NewPoiRow<'a> {
        let record = self.record;
        NewPoiRow {
            zone_id,
            external_id: record.external_id.as_deref(),
            name: &record.name,
            latitude: record.latitude,
            longitude: record.longitude,
            category: record.category.as_str(),
            description: record.description.as_deref(),
            source_text: record.source_text.as_deref(),
            image_url: record.image_url.as_deref(),
            wikipedia_url: record.wikipedia_url.as_deref(),
            wikidata_id: record.wikidata_id.as_deref(),
            tags: &self.tags,
        }
    }

    pub(crate) fn refresh(&'a self, updated_at: DateTime<Utc>) -> PoiRefreshChangeset<'a> {
        let record = self.record;
        PoiRefreshChangeset {
            name: &record.name,
            latitude: record.latitude,
            longitude: record.longitude,
            category: record.category.as_str(),
            description: record.description.as_deref(),
            source_text: record.source_text.as_deref(),
            image_url: record.image_url.as_deref(),
            wikipedia_url: record.wikipedia_url.as_deref(),
            wikidata_id: record.wikidata_id.as_deref(),
            tags: &self.tags,
            updated_at,
        }
    }
}
