//! Driven port for persisting enriched POIs and their audio scripts.

use async_trait::async_trait;
use uuid::Uuid;

use super::define_port_error;
use crate::domain::{AudioScript, PoiUpsertRecord, StoredPoi};

/// Row counts reported by one bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub created: u64,
    pub updated: u64,
}

define_port_error! {
    /// Errors raised while persisting POIs.
    pub enum PoiRepositoryError {
        /// Repository connection could not be established.
        Connection => "poi persistence connection failed",
        /// Query or mutation failed during execution.
        Query => "poi persistence query failed",
    }
}

/// Port for POI storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiRepository: Send + Sync {
    /// Insert or update `records` for `zone_id` inside one transaction.
    ///
    /// Records with an external id update the existing row sharing it, or
    /// insert a new one; records without an external id are always inserted.
    /// Any failure rolls back the whole batch.
    async fn upsert_pois(
        &self,
        zone_id: Uuid,
        records: &[PoiUpsertRecord],
    ) -> Result<UpsertCounts, PoiRepositoryError>;

    /// Load one POI by internal id.
    async fn find_poi(&self, poi_id: Uuid) -> Result<Option<StoredPoi>, PoiRepositoryError>;

    /// Store generated segments and their concatenated text on a POI.
    async fn save_audio_script(
        &self,
        poi_id: Uuid,
        script: &AudioScript,
    ) -> Result<(), PoiRepositoryError>;
}

/// Fixture repository that stores nothing and counts every record as created.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePoiRepository;

#[async_trait]
impl PoiRepository for FixturePoiRepository {
    async fn upsert_pois(
        &self,
        _zone_id: Uuid,
        records: &[PoiUpsertRecord],
    ) -> Result<UpsertCounts, PoiRepositoryError> {
        Ok(UpsertCounts {
            created: records.len() as u64,
            updated: 0,
        })
    }

    async fn find_poi(&self, _poi_id: Uuid) -> Result<Option<StoredPoi>, PoiRepositoryError> {
        Ok(None)
    }

    async fn save_audio_script(
        &self,
        _poi_id: Uuid,
        _script: &AudioScript,
    ) -> Result<(), PoiRepositoryError> {
        Ok(())
    }
}
