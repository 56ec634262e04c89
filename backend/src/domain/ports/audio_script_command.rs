//! Driving port for on-demand audio script generation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AudioScript, Error};

/// Driving port used by the admin HTTP layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioScriptCommand: Send + Sync {
    /// Generate, persist, and return the script for one POI.
    ///
    /// Fails with `NotFound` for unknown POIs, `InvalidRequest` when the POI
    /// has no narrative text, and `ServiceUnavailable` when the model cannot
    /// be reached.
    async fn generate_script(
        &self,
        poi_id: Uuid,
        custom_prompt: Option<String>,
    ) -> Result<AudioScript, Error>;
}

/// Fixture command for tests that never generate scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureAudioScriptCommand;

#[async_trait]
impl AudioScriptCommand for FixtureAudioScriptCommand {
    async fn generate_script(
        &self,
        _poi_id: Uuid,
        _custom_prompt: Option<String>,
    ) -> Result<AudioScript, Error> {
        Err(Error::service_unavailable("script generation is not configured"))
    }
}
