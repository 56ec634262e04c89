//! HTTP inbound adapter exposing the admin REST endpoints and health checks.

pub mod audio_scripts;
pub mod error;
pub mod health;
pub mod state;
pub mod zone_imports;

pub use error::ApiResult;
