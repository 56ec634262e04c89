//! Observable status of a zone import job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of an import job.
///
/// `Completed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportState {
    Pending,
    Fetching,
    Enriching,
    Saving,
    Completed,
    Error,
}

impl ImportState {
    /// Whether no further transition can happen.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Latest known progress of the import for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportJobStatus {
    pub zone_id: Uuid,
    pub state: ImportState,
    /// Percentage in `0..=100`; never decreases within one job.
    #[schema(maximum = 100)]
    pub progress: u8,
    pub total: u64,
    pub created: u64,
    pub updated: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ImportJobStatus {
    /// Fresh pending status for a newly admitted job.
    pub fn pending(zone_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            zone_id,
            state: ImportState::Pending,
            progress: 0,
            total: 0,
            created: 0,
            updated: 0,
            error: None,
            started_at,
            completed_at: None,
        }
    }

    /// Raise progress to `progress` (clamped to 100); lower values are ignored.
    pub fn advance_progress(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
    }

    /// Move to the successful terminal state.
    pub fn complete(&mut self, created: u64, updated: u64, at: DateTime<Utc>) {
        self.state = ImportState::Completed;
        self.created = created;
        self.updated = updated;
        self.advance_progress(100);
        self.completed_at = Some(at);
    }

    /// Move to the failed terminal state, keeping progress where it stopped.
    pub fn fail(&mut self, message: impl Into<String>, at: DateTime<Utc>) {
        self.state = ImportState::Error;
        self.error = Some(message.into());
        self.completed_at = Some(at);
    }

    /// Whether the job has finished.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
