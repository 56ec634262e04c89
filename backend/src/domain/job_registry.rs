//! Process-wide table of import job statuses keyed by zone.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ImportJobStatus;

/// Admission refused because a job for the zone is still running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("an import is already running for zone {}", .0.zone_id)]
pub struct ImportConflict(pub ImportJobStatus);

/// Latest status per zone. At most one non-terminal job exists per zone.
///
/// Entries are kept after completion so the outcome stays pollable; a new
/// admission replaces them.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<Uuid, ImportJobStatus>>,
}

impl JobRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ImportJobStatus>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a new job for `zone_id`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::JobRegistry;
    /// use chrono::Utc;
    /// use uuid::Uuid;
    ///
    /// let registry = JobRegistry::new();
    /// let zone = Uuid::new_v4();
    /// assert!(registry.start(zone, Utc::now()).is_ok());
    /// assert!(registry.start(zone, Utc::now()).is_err());
    /// ```
    pub fn start(
        &self,
        zone_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<ImportJobStatus, ImportConflict> {
        let mut jobs = self.lock();
        if let Some(current) = jobs.get(&zone_id).filter(|status| !status.is_terminal()) {
            return Err(ImportConflict(current.clone()));
        }
        let status = ImportJobStatus::pending(zone_id, started_at);
        jobs.insert(zone_id, status.clone());
        Ok(status)
    }

    /// Snapshot of the latest status for `zone_id`.
    pub fn get(&self, zone_id: Uuid) -> Option<ImportJobStatus> {
        self.lock().get(&zone_id).cloned()
    }

    /// Mutate the status for `zone_id` in place and return the result.
    ///
    /// Returns `None` when the zone has no entry.
    pub fn update<F>(&self, zone_id: Uuid, apply: F) -> Option<ImportJobStatus>
    where
        F: FnOnce(&mut ImportJobStatus),
    {
        let mut jobs = self.lock();
        let status = jobs.get_mut(&zone_id)?;
        apply(status);
        Some(status.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ImportState;

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 8, 30, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[rstest]
    fn running_job_blocks_new_admission(now: DateTime<Utc>) {
        let registry = JobRegistry::new();
        let zone = Uuid::new_v4();
        registry.start(zone, now).expect("first admission");
        registry.update(zone, |status| {
            status.state = ImportState::Enriching;
            status.advance_progress(30);
        });

        let ImportConflict(current) = registry.start(zone, now).expect_err("conflict");

        assert_eq!(current.state, ImportState::Enriching);
        assert_eq!(current.progress, 30);
        assert_eq!(registry.get(zone), Some(current));
    }

    #[rstest]
    #[case::completed(ImportState::Completed)]
    #[case::failed(ImportState::Error)]
    fn terminal_job_is_superseded(now: DateTime<Utc>, #[case] terminal: ImportState) {
        let registry = JobRegistry::new();
        let zone = Uuid::new_v4();
        registry.start(zone, now).expect("first admission");
        registry.update(zone, |status| {
            status.state = terminal;
            status.advance_progress(100);
        });

        let fresh = registry.start(zone, now).expect("re-admission");

        assert_eq!(fresh.state, ImportState::Pending);
        assert_eq!(fresh.progress, 0);
    }

    #[rstest]
    fn distinct_zones_are_independent(now: DateTime<Utc>) {
        let registry = JobRegistry::new();
        registry.start(Uuid::new_v4(), now).expect("zone a");
        registry.start(Uuid::new_v4(), now).expect("zone b");
    }

    #[rstest]
    fn unknown_zone_has_no_status(now: DateTime<Utc>) {
        let registry = JobRegistry::new();
        let zone = Uuid::new_v4();
        assert_eq!(registry.get(zone), None);
        assert_eq!(registry.update(zone, |status| status.fail("x", now)), None);
    }
}
