//! Driven port for import zones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::define_port_error;

/// Operator-defined circular import area.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_km: f64,
    pub last_import_at: Option<DateTime<Utc>>,
    pub poi_count: i64,
}

define_port_error! {
    /// Errors raised by zone storage.
    pub enum ZoneRepositoryError {
        /// Repository connection could not be established.
        Connection => "zone persistence connection failed",
        /// Query or mutation failed during execution.
        Query => "zone persistence query failed",
    }
}

/// Port for zone lookups and post-import statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Zone by internal id.
    async fn find_zone(&self, zone_id: Uuid) -> Result<Option<Zone>, ZoneRepositoryError>;

    /// Zone by its unique name.
    async fn find_zone_by_name(&self, name: &str) -> Result<Option<Zone>, ZoneRepositoryError>;

    /// Stamp `last_import_at` and recount POIs; returns the new count.
    async fn record_import(
        &self,
        zone_id: Uuid,
        imported_at: DateTime<Utc>,
    ) -> Result<i64, ZoneRepositoryError>;
}

/// Fixture repository with no zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureZoneRepository;

#[async_trait]
impl ZoneRepository for FixtureZoneRepository {
    async fn find_zone(&self, _zone_id: Uuid) -> Result<Option<Zone>, ZoneRepositoryError> {
        Ok(None)
    }

    async fn find_zone_by_name(&self, _name: &str) -> Result<Option<Zone>, ZoneRepositoryError> {
        Ok(None)
    }

    async fn record_import(
        &self,
        _zone_id: Uuid,
        _imported_at: DateTime<Utc>,
    ) -> Result<i64, ZoneRepositoryError> {
        Ok(0)
    }
}
