//! Wikidata outbound adapter implementing `KnowledgeBaseSource`.

mod dto;
mod http_source;

pub use http_source::{WikidataEndpoints, WikidataHttpSource};
