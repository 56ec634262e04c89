//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod article_source;
mod audio_script_command;
mod enrichment_cache;
mod knowledge_base_source;
mod language_model;
mod poi_repository;
mod poi_source;
mod zone_import_command;
mod zone_repository;

#[cfg(test)]
pub use article_source::MockArticleSource;
pub use article_source::{ArticleSource, ArticleSourceError, FixtureArticleSource};
#[cfg(test)]
pub use audio_script_command::MockAudioScriptCommand;
pub use audio_script_command::{AudioScriptCommand, FixtureAudioScriptCommand};
pub use enrichment_cache::{EnrichmentCache, language_cache_key};
#[cfg(test)]
pub use knowledge_base_source::MockKnowledgeBaseSource;
pub use knowledge_base_source::{
    FixtureKnowledgeBaseSource, KnowledgeBaseError, KnowledgeBaseSource,
};
#[cfg(test)]
pub use language_model::MockLanguageModel;
pub use language_model::{
    CompletionRequest, FixtureLanguageModel, LanguageModel, LanguageModelError,
};
#[cfg(test)]
pub use poi_repository::MockPoiRepository;
pub use poi_repository::{FixturePoiRepository, PoiRepository, PoiRepositoryError, UpsertCounts};
#[cfg(test)]
pub use poi_source::MockPoiSource;
pub use poi_source::{FixturePoiSource, PoiQuery, PoiSource, PoiSourceError};
#[cfg(test)]
pub use zone_import_command::MockZoneImportCommand;
pub use zone_import_command::{FixtureZoneImportCommand, ZoneImportCommand};
#[cfg(test)]
pub use zone_repository::MockZoneRepository;
pub use zone_repository::{FixtureZoneRepository, Zone, ZoneRepository, ZoneRepositoryError};
