//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **overpass**, **wikidata**, **wikipedia**: rate-limited reqwest clients
//!   for the public knowledge services
//! - **ollama**: local language model client
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **cache**: in-process enrichment caches
//!
//! Adapters translate between domain types and wire or row representations.
//! They contain no business logic.

pub mod cache;
pub(crate) mod http_support;
pub mod ollama;
pub mod overpass;
pub mod persistence;
pub mod rate_limiter;
pub mod wikidata;
pub mod wikipedia;
