//! In-memory port implementations shared by service tests.
//!
//! Clones share the same underlying store, so one repository can back
//! several services.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use maintrack_domain::backup::BackupSchedule;
use maintrack_domain::error::MaintrackError;
use maintrack_domain::id::{BackupScheduleId, MachineId, PartId, SiteId, UserId};
use maintrack_domain::machine::Machine;
use maintrack_domain::maintenance::{MaintenanceLog, MaintenancePart};
use maintrack_domain::site::Site;
use maintrack_domain::time::Date;
use maintrack_domain::user::User;

use crate::ports::{
    BackupScheduleRepository, MachineRepository, MaintenanceRepository, SiteRepository,
    UserRepository,
};

#[derive(Default, Clone)]
pub struct InMemorySiteRepo {
    store: Arc<Mutex<HashMap<SiteId, Site>>>,
}

impl SiteRepository for InMemorySiteRepo {
    fn create(&self, site: Site) -> impl Future<Output = Result<Site, MaintrackError>> + Send {
        self.store.lock().unwrap().insert(site.id, site.clone());
        async move { Ok(site) }
    }

    fn get_by_id(
        &self,
        id: SiteId,
    ) -> impl Future<Output = Result<Option<Site>, MaintrackError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async move { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Site>, MaintrackError>> + Send {
        let mut result: Vec<Site> = self.store.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async move { Ok(result) }
    }

    fn update(&self, site: Site) -> impl Future<Output = Result<Site, MaintrackError>> + Send {
        self.store.lock().unwrap().insert(site.id, site.clone());
        async move { Ok(site) }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMachineRepo {
    store: Arc<Mutex<HashMap<MachineId, Machine>>>,
}

impl MachineRepository for InMemoryMachineRepo {
    fn create(
        &self,
        machine: Machine,
    ) -> impl Future<Output = Result<Machine, MaintrackError>> + Send {
        self.store.lock().unwrap().insert(machine.id, machine.clone());
        async move { Ok(machine) }
    }

    fn get_by_id(
        &self,
        id: MachineId,
    ) -> impl Future<Output = Result<Option<Machine>, MaintrackError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async move { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Machine>, MaintrackError>> + Send {
        let mut result: Vec<Machine> = self.store.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async move { Ok(result) }
    }

    fn find_by_site(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Vec<Machine>, MaintrackError>> + Send {
        let result: Vec<Machine> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.site_id == site_id)
            .cloned()
            .collect();
        async move { Ok(result) }
    }

    fn update(
        &self,
        machine: Machine,
    ) -> impl Future<Output = Result<Machine, MaintrackError>> + Send {
        self.store.lock().unwrap().insert(machine.id, machine.clone());
        async move { Ok(machine) }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryUserRepo {
    store: Arc<Mutex<HashMap<UserId, User>>>,
}

impl UserRepository for InMemoryUserRepo {
    fn create(&self, user: User) -> impl Future<Output = Result<User, MaintrackError>> + Send {
        self.store.lock().unwrap().insert(user.id, user.clone());
        async move { Ok(user) }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, MaintrackError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async move { Ok(result) }
    }

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, MaintrackError>> + Send {
        let result = self
            .store
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned();
        async move { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<User>, MaintrackError>> + Send {
        let mut result: Vec<User> = self.store.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| a.username.cmp(&b.username));
        async move { Ok(result) }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMaintenanceRepo {
    parts: Arc<Mutex<HashMap<PartId, MaintenancePart>>>,
    logs: Arc<Mutex<Vec<MaintenanceLog>>>,
}

impl MaintenanceRepository for InMemoryMaintenanceRepo {
    fn create_part(
        &self,
        part: MaintenancePart,
    ) -> impl Future<Output = Result<MaintenancePart, MaintrackError>> + Send {
        self.parts.lock().unwrap().insert(part.id, part.clone());
        async move { Ok(part) }
    }

    fn get_part(
        &self,
        id: PartId,
    ) -> impl Future<Output = Result<Option<MaintenancePart>, MaintrackError>> + Send {
        let result = self.parts.lock().unwrap().get(&id).cloned();
        async move { Ok(result) }
    }

    fn list_parts(
        &self,
    ) -> impl Future<Output = Result<Vec<MaintenancePart>, MaintrackError>> + Send {
        let mut result: Vec<MaintenancePart> =
            self.parts.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async move { Ok(result) }
    }

    fn record(
        &self,
        log: MaintenanceLog,
    ) -> impl Future<Output = Result<MaintenanceLog, MaintrackError>> + Send {
        self.logs.lock().unwrap().push(log.clone());
        async move { Ok(log) }
    }

    fn find_by_machine(
        &self,
        machine_id: MachineId,
    ) -> impl Future<Output = Result<Vec<MaintenanceLog>, MaintrackError>> + Send {
        // Insertion order on purpose: services must sort.
        let result: Vec<MaintenanceLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.machine_id == machine_id)
            .cloned()
            .collect();
        async move { Ok(result) }
    }

    fn last_maintenance(
        &self,
        machine_id: MachineId,
    ) -> impl Future<Output = Result<Option<Date>, MaintrackError>> + Send {
        let result = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.machine_id == machine_id)
            .map(|l| l.maintenance_date)
            .max();
        async move { Ok(result) }
    }
}

#[derive(Default, Clone)]
pub struct InMemoryBackupRepo {
    store: Arc<Mutex<HashMap<BackupScheduleId, BackupSchedule>>>,
}

impl BackupScheduleRepository for InMemoryBackupRepo {
    fn create(
        &self,
        schedule: BackupSchedule,
    ) -> impl Future<Output = Result<BackupSchedule, MaintrackError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(schedule.id, schedule.clone());
        async move { Ok(schedule) }
    }

    fn get_by_id(
        &self,
        id: BackupScheduleId,
    ) -> impl Future<Output = Result<Option<BackupSchedule>, MaintrackError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async move { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<BackupSchedule>, MaintrackError>> + Send {
        let mut result: Vec<BackupSchedule> =
            self.store.lock().unwrap().values().cloned().collect();
        result.sort_by_key(|s| s.created_at);
        async move { Ok(result) }
    }

    fn update(
        &self,
        schedule: BackupSchedule,
    ) -> impl Future<Output = Result<BackupSchedule, MaintrackError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(schedule.id, schedule.clone());
        async move { Ok(schedule) }
    }

    fn delete(
        &self,
        id: BackupScheduleId,
    ) -> impl Future<Output = Result<(), MaintrackError>> + Send {
        self.store.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}
