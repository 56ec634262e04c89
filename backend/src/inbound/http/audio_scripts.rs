//! Admin endpoint generating the narrated script for one POI.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{AudioScript, Error, Segment};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Optional request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioScriptRequestBody {
    /// Replaces the built-in prompt; `{name}`, `{category}` and `{content}`
    /// are substituted.
    pub custom_prompt: Option<String>,
}

/// Generated script.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioScriptResponseBody {
    pub segments: Vec<Segment>,
    /// Sum of segment durations in seconds.
    pub total_duration: u32,
    pub full_text: String,
}

impl From<AudioScript> for AudioScriptResponseBody {
    fn from(script: AudioScript) -> Self {
        Self {
            total_duration: script.total_duration_seconds(),
            full_text: script.full_text(),
            segments: script.segments,
        }
    }
}

/// Generate and store an audio script for a POI.
#[utoipa::path(
    post,
    path = "/api/v1/admin/pois/{poi_id}/audio-script",
    params(("poi_id" = Uuid, Path, description = "POI to narrate")),
    request_body(content = Option<AudioScriptRequestBody>, description = "Optional prompt override"),
    responses(
        (status = 200, description = "Script generated and stored", body = AudioScriptResponseBody),
        (status = 400, description = "POI has no source text", body = Error),
        (status = 404, description = "Unknown POI", body = Error),
        (status = 503, description = "Language model unreachable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "generateAudioScript"
)]
#[post("/admin/pois/{poi_id}/audio-script")]
pub async fn generate_audio_script(
    state: web::Data<HttpState>,
    poi_id: web::Path<Uuid>,
    body: Option<web::Json<AudioScriptRequestBody>>,
) -> ApiResult<HttpResponse> {
    let custom_prompt = body
        .map(web::Json::into_inner)
        .unwrap_or_default()
        .custom_prompt
        .filter(|prompt| !prompt.trim().is_empty());
    let script = state
        .audio_scripts
        .generate_script(poi_id.into_inner(), custom_prompt)
        .await?;
    Ok(HttpResponse::Ok().json(AudioScriptResponseBody::from(script)))
}
