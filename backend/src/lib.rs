//! Audio-guide backend library: POI import pipeline, enrichment adapters and
//! the admin HTTP surface.

pub mod app;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
