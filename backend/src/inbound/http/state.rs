//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only on
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AudioScriptCommand, FixtureAudioScriptCommand, FixtureZoneImportCommand, ZoneImportCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub zone_imports: Arc<dyn ZoneImportCommand>,
    pub audio_scripts: Arc<dyn AudioScriptCommand>,
}

impl HttpState {
    /// Construct state from the two admin use-cases.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{FixtureAudioScriptCommand, FixtureZoneImportCommand};
    /// use backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureZoneImportCommand),
    ///     Arc::new(FixtureAudioScriptCommand),
    /// );
    /// let _imports = state.zone_imports.clone();
    /// ```
    pub fn new(
        zone_imports: Arc<dyn ZoneImportCommand>,
        audio_scripts: Arc<dyn AudioScriptCommand>,
    ) -> Self {
        Self {
            zone_imports,
            audio_scripts,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureZoneImportCommand),
            Arc::new(FixtureAudioScriptCommand),
        )
    }
}
