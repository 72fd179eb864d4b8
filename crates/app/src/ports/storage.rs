//! Storage port: repository traits for persistence.

use std::future::Future;

use maintrack_domain::backup::BackupSchedule;
use maintrack_domain::error::MaintrackError;
use maintrack_domain::id::{BackupScheduleId, MachineId, PartId, SiteId, UserId};
use maintrack_domain::machine::Machine;
use maintrack_domain::maintenance::{MaintenanceLog, MaintenancePart};
use maintrack_domain::site::Site;
use maintrack_domain::time::Date;
use maintrack_domain::user::User;

/// Repository for persisting and querying [`Site`]s, including their
/// user memberships.
pub trait SiteRepository {
    fn create(&self, site: Site) -> impl Future<Output = Result<Site, MaintrackError>> + Send;

    fn get_by_id(
        &self,
        id: SiteId,
    ) -> impl Future<Output = Result<Option<Site>, MaintrackError>> + Send;

    /// All sites ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Site>, MaintrackError>> + Send;

    /// Replace a site's fields and its full set of member users.
    fn update(&self, site: Site) -> impl Future<Output = Result<Site, MaintrackError>> + Send;
}

/// Repository for persisting and querying [`Machine`]s.
pub trait MachineRepository {
    fn create(&self, machine: Machine)
    -> impl Future<Output = Result<Machine, MaintrackError>> + Send;

    fn get_by_id(
        &self,
        id: MachineId,
    ) -> impl Future<Output = Result<Option<Machine>, MaintrackError>> + Send;

    /// All machines ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Machine>, MaintrackError>> + Send;

    fn find_by_site(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Vec<Machine>, MaintrackError>> + Send;

    fn update(&self, machine: Machine)
    -> impl Future<Output = Result<Machine, MaintrackError>> + Send;
}

/// Repository for persisting and querying [`User`]s.
pub trait UserRepository {
    fn create(&self, user: User) -> impl Future<Output = Result<User, MaintrackError>> + Send;

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, MaintrackError>> + Send;

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, MaintrackError>> + Send;

    /// All users ordered by username.
    fn get_all(&self) -> impl Future<Output = Result<Vec<User>, MaintrackError>> + Send;
}

/// Repository for maintenance parts and the append-only maintenance log.
///
/// There is deliberately no update or delete for log entries.
pub trait MaintenanceRepository {
    fn create_part(
        &self,
        part: MaintenancePart,
    ) -> impl Future<Output = Result<MaintenancePart, MaintrackError>> + Send;

    fn get_part(
        &self,
        id: PartId,
    ) -> impl Future<Output = Result<Option<MaintenancePart>, MaintrackError>> + Send;

    /// All parts ordered by name.
    fn list_parts(&self) -> impl Future<Output = Result<Vec<MaintenancePart>, MaintrackError>> + Send;

    fn record(
        &self,
        log: MaintenanceLog,
    ) -> impl Future<Output = Result<MaintenanceLog, MaintrackError>> + Send;

    /// Logs for a machine, newest maintenance date first.
    fn find_by_machine(
        &self,
        machine_id: MachineId,
    ) -> impl Future<Output = Result<Vec<MaintenanceLog>, MaintrackError>> + Send;

    /// Most recent maintenance date for a machine, if any.
    fn last_maintenance(
        &self,
        machine_id: MachineId,
    ) -> impl Future<Output = Result<Option<Date>, MaintrackError>> + Send;
}

/// Repository for persisting and querying [`BackupSchedule`]s.
pub trait BackupScheduleRepository {
    fn create(
        &self,
        schedule: BackupSchedule,
    ) -> impl Future<Output = Result<BackupSchedule, MaintrackError>> + Send;

    fn get_by_id(
        &self,
        id: BackupScheduleId,
    ) -> impl Future<Output = Result<Option<BackupSchedule>, MaintrackError>> + Send;

    /// All schedules, oldest first.
    fn get_all(&self) -> impl Future<Output = Result<Vec<BackupSchedule>, MaintrackError>> + Send;

    fn update(
        &self,
        schedule: BackupSchedule,
    ) -> impl Future<Output = Result<BackupSchedule, MaintrackError>> + Send;

    fn delete(
        &self,
        id: BackupScheduleId,
    ) -> impl Future<Output = Result<(), MaintrackError>> + Send;
}
