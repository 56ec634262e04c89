//! Zone import orchestration.
//!
//! An import walks `pending → fetching → enriching → saving → completed`, or
//! stops in `error` at the first fatal failure. Enrichment failures are
//! tolerated per item; only fetch and persistence failures are fatal.
//! Every state and progress change goes through the [`JobRegistry`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{
    PoiQuery, PoiRepository, PoiRepositoryError, PoiSource, PoiSourceError, UpsertCounts, Zone,
    ZoneImportCommand, ZoneRepository, ZoneRepositoryError,
};
use super::{
    ContentEnricher, Error, ImportConflict, ImportJobStatus, ImportState, JobRegistry,
    MetadataEnricher, PoiUpsertRecord, WikidataId,
};

/// Progress reached when metadata enrichment finishes.
pub const METADATA_PROGRESS_END: u8 = 25;
/// Progress reached when content enrichment finishes and saving begins.
pub const CONTENT_PROGRESS_END: u8 = 75;

/// Content language requested when none is configured.
pub const DEFAULT_CONTENT_LANGUAGE: &str = "fr";

/// Driven ports used by the pipeline.
#[derive(Clone)]
pub struct ImportPipelinePorts {
    pub poi_source: Arc<dyn PoiSource>,
    pub poi_repository: Arc<dyn PoiRepository>,
    pub zone_repository: Arc<dyn ZoneRepository>,
}

/// Enrichment stages run between fetching and saving.
#[derive(Clone)]
pub struct ImportEnrichers {
    pub metadata: MetadataEnricher,
    pub content: ContentEnricher,
}

#[derive(Debug, thiserror::Error)]
enum ImportFailure {
    #[error("fetching POIs failed: {0}")]
    Fetch(#[from] PoiSourceError),
    #[error("saving POIs failed: {0}")]
    Persist(#[from] PoiRepositoryError),
}

/// Runs one zone import to a terminal state.
#[derive(Clone)]
pub struct ImportPipeline {
    ports: ImportPipelinePorts,
    enrichers: ImportEnrichers,
    registry: Arc<JobRegistry>,
    clock: Arc<dyn Clock>,
    language: String,
}

impl ImportPipeline {
    /// Build a pipeline requesting content in [`DEFAULT_CONTENT_LANGUAGE`].
    pub fn new(
        ports: ImportPipelinePorts,
        enrichers: ImportEnrichers,
        registry: Arc<JobRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ports,
            enrichers,
            registry,
            clock,
            language: DEFAULT_CONTENT_LANGUAGE.to_owned(),
        }
    }

    /// Override the preferred article language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Registry receiving status updates.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Run the import for an admitted `zone` and return its terminal status.
    ///
    /// The zone must already have a pending entry in the registry.
    pub async fn run(&self, zone: &Zone) -> ImportJobStatus {
        let outcome = self.execute(zone).await;
        let now = self.clock.utc();
        let terminal = match outcome {
            Ok(counts) => {
                info!(
                    zone_id = %zone.id,
                    created = counts.created,
                    updated = counts.updated,
                    "zone import completed"
                );
                self.registry.update(zone.id, |status| {
                    status.complete(counts.created, counts.updated, now);
                })
            }
            Err(error) => {
                warn!(zone_id = %zone.id, %error, "zone import failed");
                self.registry
                    .update(zone.id, |status| status.fail(error.to_string(), now))
            }
        };
        terminal.unwrap_or_else(|| {
            warn!(zone_id = %zone.id, "import finished for a zone missing from the registry");
            ImportJobStatus::pending(zone.id, now)
        })
    }

    async fn execute(&self, zone: &Zone) -> Result<UpsertCounts, ImportFailure> {
        self.transition(zone.id, ImportState::Fetching, 0);
        let query = PoiQuery {
            latitude: zone.center_lat,
            longitude: zone.center_lng,
            radius_km: zone.radius_km,
        };
        let raw_pois = self.ports.poi_source.fetch_pois(&query).await?;
        let total = u64::try_from(raw_pois.len()).unwrap_or(u64::MAX);
        info!(zone_id = %zone.id, total, "zone POIs fetched");
        self.registry.update(zone.id, |status| status.total = total);

        if raw_pois.is_empty() {
            self.record_zone_stats(zone.id).await;
            return Ok(UpsertCounts::default());
        }

        self.transition(zone.id, ImportState::Enriching, 0);
        let ids: Vec<WikidataId> = raw_pois
            .iter()
            .filter_map(|poi| poi.wikidata_id.clone())
            .collect();
        let metadata = self
            .enrichers
            .metadata
            .enrich(&ids, |done, total| {
                self.report_progress(zone.id, 0, METADATA_PROGRESS_END, done, total);
            })
            .await;
        self.report_progress(zone.id, 0, METADATA_PROGRESS_END, 1, 1);

        let content = self
            .enrichers
            .content
            .enrich(&ids, &self.language, |done, total| {
                self.report_progress(
                    zone.id,
                    METADATA_PROGRESS_END,
                    CONTENT_PROGRESS_END,
                    done,
                    total,
                );
            })
            .await;

        self.transition(zone.id, ImportState::Saving, CONTENT_PROGRESS_END);
        let records: Vec<PoiUpsertRecord> = raw_pois
            .iter()
            .map(|poi| {
                let id = poi.wikidata_id.as_ref();
                PoiUpsertRecord::from_parts(
                    poi,
                    id.and_then(|id| metadata.get(id)),
                    id.and_then(|id| content.get(id)),
                )
            })
            .collect();
        let counts = self
            .ports
            .poi_repository
            .upsert_pois(zone.id, &records)
            .await?;

        self.record_zone_stats(zone.id).await;
        Ok(counts)
    }

    fn transition(&self, zone_id: Uuid, state: ImportState, progress: u8) {
        info!(%zone_id, ?state, "zone import state changed");
        self.registry.update(zone_id, |status| {
            status.state = state;
            status.advance_progress(progress);
        });
    }

    fn report_progress(&self, zone_id: Uuid, from: u8, to: u8, done: usize, total: usize) {
        let progress = scale_progress(from, to, done, total);
        self.registry
            .update(zone_id, |status| status.advance_progress(progress));
    }

    async fn record_zone_stats(&self, zone_id: Uuid) {
        match self
            .ports
            .zone_repository
            .record_import(zone_id, self.clock.utc())
            .await
        {
            Ok(poi_count) => info!(%zone_id, poi_count, "zone statistics refreshed"),
            Err(error) => warn!(%zone_id, %error, "zone statistics refresh failed"),
        }
    }
}

/// Map `done / total` onto the `from..=to` progress band.
fn scale_progress(from: u8, to: u8, done: usize, total: usize) -> u8 {
    if total == 0 {
        return to;
    }
    let span = usize::from(to.saturating_sub(from));
    let offset = span * done.min(total) / total;
    from.saturating_add(u8::try_from(offset).unwrap_or(u8::MAX)).min(to)
}

/// Driving-port implementation admitting imports and launching them.
#[derive(Clone)]
pub struct ZoneImportService {
    pipeline: Arc<ImportPipeline>,
    zones: Arc<dyn ZoneRepository>,
}

impl ZoneImportService {
    /// Build the service; the pipeline's registry is the admission table.
    pub fn new(pipeline: Arc<ImportPipeline>, zones: Arc<dyn ZoneRepository>) -> Self {
        Self { pipeline, zones }
    }
}

#[async_trait]
impl ZoneImportCommand for ZoneImportService {
    async fn start_import(&self, zone_id: Uuid) -> Result<ImportJobStatus, Error> {
        let zone = self
            .zones
            .find_zone(zone_id)
            .await
            .map_err(map_zone_error)?
            .ok_or_else(|| Error::not_found(format!("zone {zone_id} not found")))?;

        let status = self
            .pipeline
            .registry()
            .start(zone.id, self.pipeline.clock.utc())
            .map_err(map_conflict)?;
        info!(%zone_id, zone = %zone.name, "zone import admitted");

        let pipeline = Arc::clone(&self.pipeline);
        tokio::spawn(async move {
            pipeline.run(&zone).await;
        });
        Ok(status)
    }

    async fn import_status(&self, zone_id: Uuid) -> Result<ImportJobStatus, Error> {
        self.pipeline
            .registry()
            .get(zone_id)
            .ok_or_else(|| Error::not_found(format!("no import found for zone {zone_id}")))
    }
}

fn map_zone_error(error: ZoneRepositoryError) -> Error {
    match error {
        ZoneRepositoryError::Connection { message } | ZoneRepositoryError::Query { message } => {
            Error::service_unavailable(format!("failed to load zone: {message}"))
        }
    }
}

fn map_conflict(conflict: ImportConflict) -> Error {
    let error = Error::conflict(conflict.to_string());
    match serde_json::to_value(&conflict.0) {
        Ok(details) => error.with_details(details),
        Err(_) => error,
    }
}
