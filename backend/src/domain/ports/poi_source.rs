//! Driven port for fetching raw POIs around a zone centre.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::RawPoi;

/// Circular area to search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoiQuery {
    /// Centre latitude in WGS84.
    pub latitude: f64,
    /// Centre longitude in WGS84.
    pub longitude: f64,
    pub radius_km: f64,
}

define_port_error! {
    /// Errors raised while querying the geo source. All are fatal for an import.
    pub enum PoiSourceError {
        /// Network transport failed before a response arrived.
        Transport => "poi source transport failed",
        /// The call exceeded its timeout.
        Timeout => "poi source timeout",
        /// The service rejected the call as over quota.
        RateLimited => "poi source rate limited request",
        /// The response body could not be decoded.
        Decode => "poi source response decode failed",
        /// The query was rejected before or by the service.
        InvalidRequest => "poi source request invalid",
    }
}

/// Port for retrieving named, cross-referenced POIs in a radius.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Fetch de-duplicated POIs for one zone.
    async fn fetch_pois(&self, query: &PoiQuery) -> Result<Vec<RawPoi>, PoiSourceError>;
}

/// Fixture source returning no POIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePoiSource;

#[async_trait]
impl PoiSource for FixturePoiSource {
    async fn fetch_pois(&self, _query: &PoiQuery) -> Result<Vec<RawPoi>, PoiSourceError> {
        Ok(Vec::new())
    }
}
