//! Construction of the import pipeline and admin services from settings.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use super::settings::{ServerSettings, SettingsError};
use crate::domain::ports::{
    ArticleSource, KnowledgeBaseSource, LanguageModel, PoiRepository, PoiSource, ZoneRepository,
};
use crate::domain::{
    AudioScriptService, ContentEnricher, ImportEnrichers, ImportPipeline, ImportPipelinePorts,
    JobRegistry, MetadataEnricher, ScriptGenerator, ZoneImportService,
};
use crate::outbound::cache::InMemoryEnrichmentCache;
use crate::outbound::ollama::OllamaHttpModel;
use crate::outbound::overpass::{OverpassHttpIdentity, OverpassHttpSource};
use crate::outbound::persistence::{DbPool, DieselPoiRepository, DieselZoneRepository};
use crate::outbound::rate_limiter::RateLimiter;
use crate::outbound::wikidata::{WikidataEndpoints, WikidataHttpSource};
use crate::outbound::wikipedia::WikipediaHttpSource;

/// Failure while assembling components.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Adapters talking to external services.
#[derive(Clone)]
pub struct ExternalServices {
    pub poi_source: Arc<dyn PoiSource>,
    pub knowledge_base: Arc<dyn KnowledgeBaseSource>,
    pub articles: Arc<dyn ArticleSource>,
    pub language_model: Arc<dyn LanguageModel>,
}

impl ExternalServices {
    /// Build HTTP adapters, one rate limiter per service.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError`] for invalid URLs or client construction
    /// failures.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ComponentError> {
        let timeout = settings.http_timeout();
        let user_agent = settings.user_agent();

        let poi_source = OverpassHttpSource::new(
            settings.overpass_url()?,
            timeout,
            Arc::new(RateLimiter::new(settings.overpass_interval())),
            OverpassHttpIdentity {
                user_agent: user_agent.to_owned(),
                ..OverpassHttpIdentity::default()
            },
        )?;
        let knowledge_base = WikidataHttpSource::new(
            WikidataEndpoints {
                sparql: settings.wikidata_sparql_url()?,
                api: settings.wikidata_api_url()?,
                language: settings.content_language(),
            },
            timeout,
            user_agent,
            Arc::new(RateLimiter::new(settings.wikidata_interval())),
        )?;
        let articles = WikipediaHttpSource::new(
            settings.wikipedia_rest_url(),
            timeout,
            user_agent,
            Arc::new(RateLimiter::new(settings.wikipedia_interval())),
        )?;
        let language_model = OllamaHttpModel::new(
            settings.ollama_url()?,
            settings.ollama_model(),
            settings.llm_timeout(),
            user_agent,
        )?;

        Ok(Self {
            poi_source: Arc::new(poi_source),
            knowledge_base: Arc::new(knowledge_base),
            articles: Arc::new(articles),
            language_model: Arc::new(language_model),
        })
    }
}

/// Repositories backing the pipeline and the script service.
#[derive(Clone)]
pub struct Repositories {
    pub pois: Arc<dyn PoiRepository>,
    pub zones: Arc<dyn ZoneRepository>,
}

impl Repositories {
    /// Diesel repositories sharing `pool`.
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            pois: Arc::new(DieselPoiRepository::new(pool.clone())),
            zones: Arc::new(DieselZoneRepository::new(pool)),
        }
    }
}

/// Fully wired application services.
#[derive(Clone)]
pub struct AppComponents {
    pub pipeline: Arc<ImportPipeline>,
    pub zone_imports: Arc<ZoneImportService>,
    pub audio_scripts: Arc<AudioScriptService>,
    pub zones: Arc<dyn ZoneRepository>,
}

impl AppComponents {
    /// Wire the pipeline with in-memory caches and a fresh registry.
    pub fn assemble(
        services: ExternalServices,
        repositories: Repositories,
        language: impl Into<String>,
    ) -> Self {
        Self::assemble_with_clock(services, repositories, language, Arc::new(DefaultClock))
    }

    /// As [`AppComponents::assemble`] with an explicit clock.
    pub fn assemble_with_clock(
        services: ExternalServices,
        repositories: Repositories,
        language: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let metadata = MetadataEnricher::new(
            services.knowledge_base.clone(),
            Arc::new(InMemoryEnrichmentCache::new()),
        );
        let content = ContentEnricher::new(
            services.knowledge_base,
            services.articles,
            Arc::new(InMemoryEnrichmentCache::new()),
            Arc::new(InMemoryEnrichmentCache::new()),
        );
        let pipeline = Arc::new(
            ImportPipeline::new(
                ImportPipelinePorts {
                    poi_source: services.poi_source,
                    poi_repository: repositories.pois.clone(),
                    zone_repository: repositories.zones.clone(),
                },
                ImportEnrichers { metadata, content },
                Arc::new(JobRegistry::new()),
                clock,
            )
            .with_language(language),
        );
        let zone_imports = Arc::new(ZoneImportService::new(
            pipeline.clone(),
            repositories.zones.clone(),
        ));
        let audio_scripts = Arc::new(AudioScriptService::new(
            repositories.pois,
            ScriptGenerator::new(services.language_model),
        ));

        Self {
            pipeline,
            zone_imports,
            audio_scripts,
            zones: repositories.zones,
        }
    }
}
