//! Ollama outbound adapter implementing `LanguageModel`.
//!
//! Generation uses `POST /api/generate` without streaming. Availability is a
//! short `GET /api/tags` check on its own client so a slow model never delays
//! the check.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{CompletionRequest, LanguageModel, LanguageModelError};
use crate::outbound::http_support::{body_preview, build_client};

/// Generation timeout applied when none is configured.
pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(120);
/// Availability check timeout.
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct GenerateRequestDto<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponseDto {
    #[serde(default)]
    response: String,
}

/// Language model adapter for a local Ollama server.
pub struct OllamaHttpModel {
    generate_client: Client,
    ping_client: Client,
    base_url: Url,
    model: String,
}

impl OllamaHttpModel {
    /// Build the adapter for `model` served at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when a reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        model: impl Into<String>,
        generate_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            generate_client: build_client(generate_timeout, user_agent)?,
            ping_client: build_client(PING_TIMEOUT, user_agent)?,
            base_url,
            model: model.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, LanguageModelError> {
        endpoint(&self.base_url, path)
    }
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url, LanguageModelError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path).map_err(|error| {
        LanguageModelError::unavailable(format!("invalid model URL {base_url}: {error}"))
    })
}

#[async_trait]
impl LanguageModel for OllamaHttpModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LanguageModelError> {
        let payload = GenerateRequestDto {
            model: &self.model,
            system: &request.system,
            prompt: &request.prompt,
            format: request.json_output.then_some("json"),
            stream: false,
        };
        debug!(model = %self.model, "requesting generation");
        let response = self
            .generate_client
            .post(self.endpoint("api/generate")?)
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let decoded: GenerateResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|error| LanguageModelError::decode(error.to_string()))?;
        Ok(decoded.response)
    }

    async fn is_available(&self) -> bool {
        let Ok(url) = self.endpoint("api/tags") else {
            return false;
        };
        match self.ping_client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                debug!(%error, "model availability check failed");
                false
            }
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> LanguageModelError {
    if error.is_timeout() {
        LanguageModelError::timeout(error.to_string())
    } else {
        LanguageModelError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> LanguageModelError {
    LanguageModelError::api(format!(
        "status {}: {}",
        status.as_u16(),
        body_preview(body)
    ))
}
