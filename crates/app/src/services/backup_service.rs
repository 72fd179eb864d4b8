//! Backup service: use-cases for managing backup schedules.

use maintrack_domain::backup::BackupSchedule;
use maintrack_domain::error::{MaintrackError, NotFoundError};
use maintrack_domain::id::BackupScheduleId;

use crate::ports::BackupScheduleRepository;

/// Application service for backup schedule CRUD operations.
pub struct BackupService<R> {
    repo: R,
}

impl<R: BackupScheduleRepository> BackupService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new schedule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, schedule), fields(schedule_name = %schedule.name))]
    pub async fn create_schedule(
        &self,
        schedule: BackupSchedule,
    ) -> Result<BackupSchedule, MaintrackError> {
        schedule.validate()?;
        self.repo.create(schedule).await
    }

    /// Look up a schedule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] when no schedule with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_schedule(&self, id: BackupScheduleId) -> Result<BackupSchedule, MaintrackError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Backup schedule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all schedules, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_schedules(&self) -> Result<Vec<BackupSchedule>, MaintrackError> {
        self.repo.get_all().await
    }

    /// Pause or resume a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] when the schedule does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        id: BackupScheduleId,
        enabled: bool,
    ) -> Result<BackupSchedule, MaintrackError> {
        let mut schedule = self.get_schedule(id).await?;
        schedule.enabled = enabled;
        self.repo.update(schedule).await
    }

    /// Delete a schedule by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_schedule(&self, id: BackupScheduleId) -> Result<(), MaintrackError> {
        self.repo.delete(id).await
    }
}
