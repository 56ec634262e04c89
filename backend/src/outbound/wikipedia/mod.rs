//! Wikipedia outbound adapter implementing `ArticleSource`.

mod dto;
mod html_text;
mod http_source;

pub use html_text::html_to_text;
pub use http_source::{DEFAULT_REST_URL_TEMPLATE, WikipediaHttpSource};
