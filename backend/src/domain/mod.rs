//! Domain primitives, services, and ports.
//!
//! Purpose: model POI imports and audio-guide scripts independently of any
//! transport or storage. Adapters live under `inbound` and `outbound` and talk
//! to this module only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - RawPoi, PoiUpsertRecord, Category: imported POI data and its category.
//! - MetadataEnricher, ContentEnricher: knowledge-base enrichment stages.
//! - ImportPipeline, JobRegistry, ZoneImportService: zone import jobs.
//! - ScriptGenerator, AudioScriptService: audio-guide script generation.

pub mod audio_script;
pub mod audio_script_service;
pub mod category;
pub mod content_enricher;
pub mod enrichment;
pub mod error;
pub mod import_job;
pub mod import_status;
pub mod job_registry;
pub mod metadata_enricher;
pub mod poi;
pub mod ports;
pub mod script_generator;

pub use self::audio_script::{
    AudioScript, PlaybackMode, Segment, SegmentType, WORDS_PER_MINUTE, estimate_duration_seconds,
};
pub use self::audio_script_service::AudioScriptService;
pub use self::category::{Category, overpass_tag_filters};
pub use self::content_enricher::{
    ContentEnricher, ContentEnrichmentError, LANGUAGE_FALLBACK_CHAIN, language_preference,
};
pub use self::enrichment::{
    ArticleRef, EnrichmentRecord, InvalidWikidataId, MergeNonNull, NarrativeContent, WikidataId,
};
pub use self::error::{Error, ErrorCode};
pub use self::import_job::{
    DEFAULT_CONTENT_LANGUAGE, ImportEnrichers, ImportPipeline, ImportPipelinePorts,
    ZoneImportService,
};
pub use self::import_status::{ImportJobStatus, ImportState};
pub use self::job_registry::{ImportConflict, JobRegistry};
pub use self::metadata_enricher::{METADATA_BATCH_SIZE, MetadataEnricher};
pub use self::poi::{ExternalId, OsmElementType, PoiUpsertRecord, RawPoi, StoredPoi};
pub use self::script_generator::{
    MAX_SOURCE_CHARS, ParseStrategy, ScriptGenerationError, ScriptGenerator, ScriptRequest,
    parse_script,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("no such zone"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
