//! Driven port for the local text-generation model.

use async_trait::async_trait;

use super::define_port_error;

/// One completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    /// Ask the model to answer with a JSON document.
    pub json_output: bool,
}

define_port_error! {
    /// Errors raised by the model service.
    pub enum LanguageModelError {
        /// The service could not be reached.
        Unavailable => "language model unavailable",
        /// Generation exceeded its timeout.
        Timeout => "language model timeout",
        /// The service answered with an error status.
        Api => "language model request failed",
        /// The response envelope could not be decoded.
        Decode => "language model response decode failed",
    }
}

/// Port for prompting the model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion and return the raw generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LanguageModelError>;

    /// Cheap reachability check used before long generations.
    async fn is_available(&self) -> bool;
}

/// Fixture model that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureLanguageModel;

#[async_trait]
impl LanguageModel for FixtureLanguageModel {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LanguageModelError> {
        Err(LanguageModelError::unavailable("fixture model"))
    }

    async fn is_available(&self) -> bool {
        false
    }
}
