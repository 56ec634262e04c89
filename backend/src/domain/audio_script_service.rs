//! On-demand audio script generation for stored POIs.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::ports::{AudioScriptCommand, PoiRepository, PoiRepositoryError};
use super::{AudioScript, Error, ScriptGenerationError, ScriptGenerator, ScriptRequest};

/// Driving-port implementation backed by the script generator.
#[derive(Clone)]
pub struct AudioScriptService {
    pois: Arc<dyn PoiRepository>,
    generator: ScriptGenerator,
}

impl AudioScriptService {
    /// Build the service.
    pub fn new(pois: Arc<dyn PoiRepository>, generator: ScriptGenerator) -> Self {
        Self { pois, generator }
    }
}

#[async_trait]
impl AudioScriptCommand for AudioScriptService {
    async fn generate_script(
        &self,
        poi_id: Uuid,
        custom_prompt: Option<String>,
    ) -> Result<AudioScript, Error> {
        let poi = self
            .pois
            .find_poi(poi_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("poi {poi_id} not found")))?;

        let source_text = poi
            .source_text
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| Error::invalid_request("POI has no source text to narrate"))?;

        if !self.generator.is_available().await {
            return Err(Error::service_unavailable(
                "script generation service is unreachable",
            ));
        }

        let request = ScriptRequest {
            poi_name: poi.name,
            source_text,
            category: poi.category,
            custom_prompt,
        };
        let script = self
            .generator
            .generate(&request)
            .await
            .map_err(map_generation_error)?;

        self.pois
            .save_audio_script(poi_id, &script)
            .await
            .map_err(map_repository_error)?;
        info!(
            %poi_id,
            segments = script.segments.len(),
            total_duration = script.total_duration_seconds(),
            "audio script generated"
        );
        Ok(script)
    }
}

fn map_generation_error(error: ScriptGenerationError) -> Error {
    match error {
        ScriptGenerationError::ServiceUnavailable { message } => {
            Error::service_unavailable(message)
        }
        ScriptGenerationError::EmptySource => {
            Error::invalid_request("POI has no source text to narrate")
        }
    }
}

fn map_repository_error(error: PoiRepositoryError) -> Error {
    match error {
        PoiRepositoryError::Connection { message } | PoiRepositoryError::Query { message } => {
            Error::service_unavailable(format!("failed to access POI storage: {message}"))
        }
    }
}
