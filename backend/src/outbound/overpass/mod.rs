//! Overpass outbound adapter.
//!
//! Thin HTTP implementation of the `PoiSource` port.

mod dto;
mod http_source;

pub use http_source::{MAX_RADIUS_KM, OverpassHttpIdentity, OverpassHttpSource};

#[cfg(test)]
pub(crate) use http_source::parse_pois;
