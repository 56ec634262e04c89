//! Helpers shared by the reqwest-backed adapters.

use std::time::Duration;

use reqwest::Client;

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Whitespace-compacted, length-capped preview of an error body.
pub fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Client with a bounded per-request timeout and the given user agent.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_owned())
        .build()
}
