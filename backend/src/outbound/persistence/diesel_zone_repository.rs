//! PostgreSQL-backed zone adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{Zone, ZoneRepository, ZoneRepositoryError};

use super::diesel_helpers::{
    is_connection_error, map_diesel_error_message, map_pool_error_message,
};
use super::models::ZoneRow;
use super::pool::{DbPool, PoolError};
use super::schema::{pois, zones};

/// Diesel-backed implementation of the zone repository port.
#[derive(Clone)]
pub struct DieselZoneRepository {
    pool: DbPool,
}

impl DieselZoneRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ZoneRepositoryError {
    ZoneRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(
    operation: &'static str,
) -> impl Fn(diesel::result::Error) -> ZoneRepositoryError {
    move |error| {
        let connection_lost = is_connection_error(&error);
        let message = map_diesel_error_message(error, operation);
        if connection_lost {
            ZoneRepositoryError::connection(message)
        } else {
            ZoneRepositoryError::query(message)
        }
    }
}

#[async_trait]
impl ZoneRepository for DieselZoneRepository {
    async fn find_zone(&self, zone_id: Uuid) -> Result<Option<Zone>, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ZoneRow> = zones::table
            .find(zone_id)
            .select(ZoneRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("zone lookup"))?;
        Ok(row.map(Zone::from))
    }

    async fn find_zone_by_name(&self, name: &str) -> Result<Option<Zone>, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ZoneRow> = zones::table
            .filter(zones::name.eq(name))
            .select(ZoneRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("zone lookup by name"))?;
        Ok(row.map(Zone::from))
    }

    async fn record_import(
        &self,
        zone_id: Uuid,
        imported_at: DateTime<Utc>,
    ) -> Result<i64, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (count, touched) = conn
            .transaction(|conn| {
                async move {
                    let count: i64 = pois::table
                        .filter(pois::zone_id.eq(zone_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    let touched = diesel::update(zones::table.find(zone_id))
                        .set((
                            zones::last_import_at.eq(Some(imported_at)),
                            zones::poi_count.eq(count),
                            zones::updated_at.eq(imported_at),
                        ))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((count, touched))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error("zone import stats"))?;

        if touched == 0 {
            return Err(ZoneRepositoryError::query(format!(
                "zone {zone_id} no longer exists"
            )));
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn closed_transactions_map_to_connection_errors() {
        let error = map_diesel_error("zone lookup")(diesel::result::Error::BrokenTransactionManager);
        assert!(matches!(error, ZoneRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn other_failures_map_to_query_errors() {
        let error = map_diesel_error("zone lookup")(diesel::result::Error::NotFound);
        assert!(matches!(error, ZoneRepositoryError::Query { .. }));
        assert!(error.to_string().contains("zone lookup"));
    }

    #[rstest]
    fn rows_convert_to_domain_zones() {
        let row = ZoneRow {
            id: Uuid::nil(),
            name: "Paris centre".to_owned(),
            center_lat: 48.8566,
            center_lng: 2.3522,
            radius_km: 2.0,
            last_import_at: None,
            poi_count: 12,
        };
        let zone = Zone::from(row);
        assert_eq!(zone.name, "Paris centre");
        assert_eq!(zone.poi_count, 12);
    }
}
