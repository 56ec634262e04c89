//! Driving port for starting and polling zone imports.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, ImportJobStatus};

/// Driving port used by the admin HTTP layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneImportCommand: Send + Sync {
    /// Admit and launch a background import for `zone_id`.
    ///
    /// Fails with `NotFound` for unknown zones and `Conflict`, carrying the
    /// running status in `details`, when an import is already active.
    async fn start_import(&self, zone_id: Uuid) -> Result<ImportJobStatus, Error>;

    /// Latest status for `zone_id`; `NotFound` when no import ever started.
    async fn import_status(&self, zone_id: Uuid) -> Result<ImportJobStatus, Error>;
}

/// Fixture command that knows no imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureZoneImportCommand;

#[async_trait]
impl ZoneImportCommand for FixtureZoneImportCommand {
    async fn start_import(&self, zone_id: Uuid) -> Result<ImportJobStatus, Error> {
        Err(Error::not_found(format!("zone {zone_id} not found")))
    }

    async fn import_status(&self, zone_id: Uuid) -> Result<ImportJobStatus, Error> {
        Err(Error::not_found(format!("no import for zone {zone_id}")))
    }
}
