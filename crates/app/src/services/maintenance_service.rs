//! Maintenance service: parts, the maintenance log, and due reports.

use maintrack_domain::error::{MaintrackError, NotFoundError, ValidationError};
use maintrack_domain::id::{MachineId, PartId};
use maintrack_domain::machine::Machine;
use maintrack_domain::maintenance::{MaintenanceLog, MaintenancePart, sort_newest_first};
use maintrack_domain::notification::MaintenanceStatus;
use maintrack_domain::time::Date;

use crate::ports::{MachineRepository, MaintenanceRepository, SiteRepository};

/// Values submitted when recording a maintenance action.
#[derive(Debug, Clone)]
pub struct NewMaintenance {
    pub maintenance_date: Date,
    pub part_id: PartId,
    pub performed_by: String,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
}

/// A machine whose site wants reminders and which needs attention.
#[derive(Debug, Clone)]
pub struct DueMachine {
    pub machine: Machine,
    pub site_name: String,
    pub status: MaintenanceStatus,
}

/// Application service for maintenance history.
pub struct MaintenanceService<LR, MR, SR> {
    repo: LR,
    machines: MR,
    sites: SR,
}

impl<LR, MR, SR> MaintenanceService<LR, MR, SR>
where
    LR: MaintenanceRepository,
    MR: MachineRepository,
    SR: SiteRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(repo: LR, machines: MR, sites: SR) -> Self {
        Self {
            repo,
            machines,
            sites,
        }
    }

    /// List all parts, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_parts(&self) -> Result<Vec<MaintenancePart>, MaintrackError> {
        self.repo.list_parts().await
    }

    /// Register a new part.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Duplicate`] when a part with the same name
    /// (ignoring case) exists, or a storage error from the repository.
    #[tracing::instrument(skip(self, part), fields(part_name = %part.name))]
    pub async fn create_part(
        &self,
        part: MaintenancePart,
    ) -> Result<MaintenancePart, MaintrackError> {
        let existing = self.repo.list_parts().await?;
        if existing
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(part.name.trim()))
        {
            return Err(ValidationError::Duplicate {
                field: "name",
                value: part.name,
            }
            .into());
        }
        self.repo.create_part(part).await
    }

    /// A machine and its maintenance history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] when the machine does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn machine_history(
        &self,
        machine_id: MachineId,
    ) -> Result<(Machine, Vec<MaintenanceLog>), MaintrackError> {
        let machine = self.find_machine(machine_id).await?;
        let mut logs = self.repo.find_by_machine(machine_id).await?;
        sort_newest_first(&mut logs);
        Ok((machine, logs))
    }

    /// Append a maintenance action to a machine's log.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::NotFound`] when the machine does not exist,
    /// [`MaintrackError::Validation`] when the part is unknown or required
    /// values are missing, or a storage error from the repository.
    #[tracing::instrument(skip(self, entry))]
    pub async fn record_maintenance(
        &self,
        machine_id: MachineId,
        entry: NewMaintenance,
    ) -> Result<MaintenanceLog, MaintrackError> {
        self.find_machine(machine_id).await?;
        let part = self.repo.get_part(entry.part_id).await?.ok_or_else(|| {
            ValidationError::UnknownReference {
                field: "part_id",
                entity: "Part",
                id: entry.part_id.to_string(),
            }
        })?;
        let log = MaintenanceLog::builder()
            .machine_id(machine_id)
            .maintenance_date(entry.maintenance_date)
            .part(part)
            .performed_by(entry.performed_by)
            .invoice_number(entry.invoice_number)
            .notes(entry.notes)
            .build()?;
        self.repo.record(log).await
    }

    /// Machines at notification-enabled sites that are due or have never
    /// been serviced, most overdue first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn due_report(&self, today: Date) -> Result<Vec<DueMachine>, MaintrackError> {
        let mut due = Vec::new();
        for site in self.sites.get_all().await? {
            if !site.enable_notifications {
                continue;
            }
            for machine in self.machines.find_by_site(site.id).await? {
                let last = self.repo.last_maintenance(machine.id).await?;
                let status =
                    MaintenanceStatus::evaluate(last, site.notification_threshold, today);
                if status.needs_attention() {
                    due.push(DueMachine {
                        machine,
                        site_name: site.name.clone(),
                        status,
                    });
                }
            }
        }
        due.sort_by_key(|entry| match entry.status {
            MaintenanceStatus::NeverServiced => i64::MIN,
            MaintenanceStatus::Due { overdue_days, .. } => -overdue_days,
            MaintenanceStatus::Ok { .. } => i64::MAX,
        });
        Ok(due)
    }

    async fn find_machine(&self, id: MachineId) -> Result<Machine, MaintrackError> {
        self.machines.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Machine",
                id: id.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{InMemoryMachineRepo, InMemoryMaintenanceRepo, InMemorySiteRepo};
    use chrono::NaiveDate;
    use maintrack_domain::site::Site;

    type Service = MaintenanceService<InMemoryMaintenanceRepo, InMemoryMachineRepo, InMemorySiteRepo>;

    struct Fixture {
        svc: Service,
        machine_id: MachineId,
        part_id: PartId,
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn fixture(enable_notifications: bool) -> Fixture {
        let sites = InMemorySiteRepo::default();
        let machines = InMemoryMachineRepo::default();
        let repo = InMemoryMaintenanceRepo::default();

        let site = sites
            .create(
                Site::builder()
                    .name("North Plant")
                    .notification_threshold(30)
                    .enable_notifications(enable_notifications)
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();
        let machine = machines
            .create(
                Machine::builder()
                    .name("Lathe")
                    .model("TL-1")
                    .site_id(site.id)
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();
        let part = repo
            .create_part(MaintenancePart::new("Belt").unwrap())
            .await
            .unwrap();

        Fixture {
            svc: MaintenanceService::new(repo, machines, sites),
            machine_id: machine.id,
            part_id: part.id,
        }
    }

    fn entry(part_id: PartId, day: Date) -> NewMaintenance {
        NewMaintenance {
            maintenance_date: day,
            part_id,
            performed_by: "Sam".to_string(),
            invoice_number: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn should_return_empty_history_for_new_machine() {
        let fx = fixture(false).await;
        let (machine, logs) = fx.svc.machine_history(fx.machine_id).await.unwrap();
        assert_eq!(machine.name, "Lathe");
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn should_return_history_newest_first() {
        let fx = fixture(false).await;
        for day in [date(2025, 1, 5), date(2025, 3, 1), date(2024, 11, 20)] {
            fx.svc
                .record_maintenance(fx.machine_id, entry(fx.part_id, day))
                .await
                .unwrap();
        }

        let (_, logs) = fx.svc.machine_history(fx.machine_id).await.unwrap();
        assert_eq!(logs[0].maintenance_date, date(2025, 3, 1));
        assert_eq!(logs[2].maintenance_date, date(2024, 11, 20));
    }

    #[tokio::test]
    async fn should_reject_log_for_unknown_part() {
        let fx = fixture(false).await;
        let result = fx
            .svc
            .record_maintenance(fx.machine_id, entry(PartId::new(), date(2025, 1, 1)))
            .await;
        assert!(matches!(
            result,
            Err(MaintrackError::Validation(ValidationError::UnknownReference {
                field: "part_id",
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_machine() {
        let fx = fixture(false).await;
        let result = fx.svc.machine_history(MachineId::new()).await;
        assert!(matches!(result, Err(MaintrackError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_duplicate_part_name() {
        let fx = fixture(false).await;
        let result = fx
            .svc
            .create_part(MaintenancePart::new("belt").unwrap())
            .await;
        assert!(matches!(
            result,
            Err(MaintrackError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn should_report_never_serviced_machine_when_notifications_enabled() {
        let fx = fixture(true).await;
        let due = fx.svc.due_report(date(2025, 6, 1)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].status, MaintenanceStatus::NeverServiced);
        assert_eq!(due[0].site_name, "North Plant");
    }

    #[tokio::test]
    async fn should_skip_sites_with_notifications_disabled() {
        let fx = fixture(false).await;
        assert!(fx.svc.due_report(date(2025, 6, 1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_skip_recently_serviced_machine() {
        let fx = fixture(true).await;
        fx.svc
            .record_maintenance(fx.machine_id, entry(fx.part_id, date(2025, 5, 25)))
            .await
            .unwrap();
        assert!(fx.svc.due_report(date(2025, 6, 1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_measure_overdue_days_from_latest_log_when_several_recorded() {
        let fx = fixture(true).await;
        for day in [date(2025, 4, 1), date(2025, 1, 1)] {
            fx.svc
                .record_maintenance(fx.machine_id, entry(fx.part_id, day))
                .await
                .unwrap();
        }

        let due = fx.svc.due_report(date(2025, 6, 1)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(
            due[0].status,
            MaintenanceStatus::Due {
                due: date(2025, 5, 1),
                overdue_days: 31,
            }
        );
    }
}
