//! PostgreSQL-backed POI adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{PoiRepository, PoiRepositoryError, UpsertCounts};
use crate::domain::{AudioScript, Category, PoiUpsertRecord, StoredPoi};

use super::diesel_helpers::{
    is_connection_error, map_diesel_error_message, map_pool_error_message,
};
use super::models::{PreparedPoi, StoredPoiRow};
use super::pool::{DbPool, PoolError};
use super::schema::pois;

/// Diesel-backed implementation of the POI repository port.
#[derive(Clone)]
pub struct DieselPoiRepository {
    pool: DbPool,
}

impl DieselPoiRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PoiRepositoryError {
    PoiRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> PoiRepositoryError {
    move |error| {
        let connection_lost = is_connection_error(&error);
        let message = map_diesel_error_message(error, operation);
        if connection_lost {
            PoiRepositoryError::connection(message)
        } else {
            PoiRepositoryError::query(message)
        }
    }
}

fn row_to_stored_poi(row: StoredPoiRow) -> Result<StoredPoi, PoiRepositoryError> {
    let category: Category = row.category.parse().map_err(|error: String| {
        PoiRepositoryError::query(format!("poi {} has invalid category: {error}", row.id))
    })?;
    Ok(StoredPoi {
        id: row.id,
        zone_id: row.zone_id,
        external_id: row.external_id,
        name: row.name,
        category,
        description: row.description,
        source_text: row.source_text,
    })
}

fn prepare(records: &[PoiUpsertRecord]) -> Result<Vec<PreparedPoi<'_>>, PoiRepositoryError> {
    records
        .iter()
        .map(|record| {
            let tags = serde_json::to_value(&record.tags).map_err(|err| {
                PoiRepositoryError::query(format!(
                    "failed to serialize tags for {}: {err}",
                    record.name
                ))
            })?;
            Ok(PreparedPoi { record, tags })
        })
        .collect()
}

#[async_trait]
impl PoiRepository for DieselPoiRepository {
    async fn upsert_pois(
        &self,
        zone_id: Uuid,
        records: &[PoiUpsertRecord],
    ) -> Result<UpsertCounts, PoiRepositoryError> {
        if records.is_empty() {
            return Ok(UpsertCounts::default());
        }

        let prepared = prepare(records)?;
        let prepared = prepared.as_slice();
        let now = Utc::now();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let counts = conn
            .transaction(|conn| {
                async move {
                    let mut counts = UpsertCounts::default();
                    for poi in prepared {
                        let existing = match poi.record.external_id.as_deref() {
                            Some(external_id) => {
                                pois::table
                                    .filter(pois::external_id.eq(external_id))
                                    .select(pois::id)
                                    .first::<Uuid>(conn)
                                    .await
                                    .optional()?
                            }
                            None => None,
                        };

                        match existing {
                            Some(poi_id) => {
                                diesel::update(pois::table.find(poi_id))
                                    .set(poi.refresh(now))
                                    .execute(conn)
                                    .await?;
                                counts.updated += 1;
                            }
                            None => {
                                diesel::insert_into(pois::table)
                                    .values(poi.new_row(zone_id))
                                    .execute(conn)
                                    .await?;
                                counts.created += 1;
                            }
                        }
                    }
                    Ok::<_, diesel::result::Error>(counts)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error("poi upsert"))?;

        debug!(
            %zone_id,
            created = counts.created,
            updated = counts.updated,
            "pois upserted"
        );
        Ok(counts)
    }

    async fn find_poi(&self, poi_id: Uuid) -> Result<Option<StoredPoi>, PoiRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StoredPoiRow> = pois::table
            .find(poi_id)
            .select(StoredPoiRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("poi lookup"))?;
        row.map(row_to_stored_poi).transpose()
    }

    async fn save_audio_script(
        &self,
        poi_id: Uuid,
        script: &AudioScript,
    ) -> Result<(), PoiRepositoryError> {
        let segments = serde_json::to_value(&script.segments).map_err(|err| {
            PoiRepositoryError::query(format!("failed to serialize segments: {err}"))
        })?;
        let full_text = script.full_text();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(pois::table.find(poi_id))
            .set((
                pois::audio_segments.eq(Some(segments)),
                pois::full_text.eq(Some(full_text)),
                pois::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("audio script save"))?;

        if updated == 0 {
            return Err(PoiRepositoryError::query(format!(
                "poi {poi_id} disappeared before its script was saved"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use rstest::rstest;

    fn stored_row(category: &str) -> StoredPoiRow {
        StoredPoiRow {
            id: Uuid::nil(),
            zone_id: None,
            external_id: Some("n1".to_owned()),
            name: "Pont Neuf".to_owned(),
            category: category.to_owned(),
            description: None,
            source_text: Some("Plus vieux pont de Paris.".to_owned()),
        }
    }

    #[rstest]
    fn stored_rows_parse_their_category() {
        let poi = row_to_stored_poi(stored_row("monuments")).expect("valid category");
        assert_eq!(poi.category, Category::Monuments);
        assert_eq!(poi.external_id.as_deref(), Some("n1"));
    }

    #[rstest]
    fn unknown_categories_are_query_errors() {
        let error = row_to_stored_poi(stored_row("castles")).expect_err("invalid category");
        assert!(matches!(error, PoiRepositoryError::Query { .. }));
    }

    fn record(description: Option<&str>) -> PoiUpsertRecord {
        PoiUpsertRecord {
            external_id: Some("n1".to_owned()),
            name: "Pont Neuf".to_owned(),
            latitude: 48.857,
            longitude: 2.341,
            category: Category::Monuments,
            description: description.map(str::to_owned),
            source_text: None,
            image_url: None,
            wikipedia_url: None,
            wikidata_id: Some("Q1".to_owned()),
            tags: BTreeMap::from([("bridge".to_owned(), "yes".to_owned())]),
        }
    }

    fn refresh_sql(record: PoiUpsertRecord) -> String {
        let records = [record];
        let prepared = prepare(&records).expect("serializes");
        let statement =
            diesel::update(pois::table.find(Uuid::nil())).set(prepared[0].refresh(Utc::now()));
        diesel::debug_query::<diesel::pg::Pg, _>(&statement).to_string()
    }

    #[rstest]
    fn tags_serialize_to_a_json_object() {
        let records = [record(None)];
        let prepared = prepare(&records).expect("serializes");
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].tags["bridge"], "yes");
        let row = prepared[0].new_row(Uuid::nil());
        assert_eq!(row.category, "monuments");
        assert_eq!(row.external_id, Some("n1"));
    }

    #[rstest]
    fn refresh_keeps_enrichment_missing_from_this_run() {
        let sql = refresh_sql(record(None));
        assert!(!sql.contains("\"description\""), "{sql}");
        assert!(!sql.contains("\"source_text\""), "{sql}");
        assert!(!sql.contains("\"zone_id\""), "{sql}");
        assert!(!sql.contains("\"created_at\""), "{sql}");
        assert!(sql.contains("\"name\""), "{sql}");
    }

    #[rstest]
    fn refresh_overwrites_enrichment_found_on_this_run() {
        let sql = refresh_sql(record(Some("Plus vieux pont de Paris.")));
        assert!(sql.contains("\"description\""), "{sql}");
    }
}
