//! Shared application state for axum handlers.

use std::sync::Arc;

use maintrack_app::services::auth_service::AuthService;
use maintrack_app::services::backup_service::BackupService;
use maintrack_app::services::email_service::EmailService;
use maintrack_app::services::machine_service::MachineService;
use maintrack_app::services::maintenance_service::MaintenanceService;
use maintrack_app::services::site_service::SiteService;
use maintrack_app::session::InProcessSessionStore;

/// Application state shared across all axum handlers.
///
/// Generic over the site, machine, user, maintenance-log and backup
/// repositories and the mailer to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<SR, MR, UR, LR, BR, ML> {
    pub site_service: Arc<SiteService<SR, UR>>,
    pub machine_service: Arc<MachineService<MR, SR>>,
    pub maintenance_service: Arc<MaintenanceService<LR, MR, SR>>,
    pub auth_service: Arc<AuthService<UR>>,
    pub backup_service: Arc<BackupService<BR>>,
    pub email_service: Arc<EmailService<ML>>,
    /// Flash queues and logged-in users, keyed by session cookie.
    pub sessions: Arc<InProcessSessionStore>,
}

impl<SR, MR, UR, LR, BR, ML> Clone for AppState<SR, MR, UR, LR, BR, ML> {
    fn clone(&self) -> Self {
        Self {
            site_service: Arc::clone(&self.site_service),
            machine_service: Arc::clone(&self.machine_service),
            maintenance_service: Arc::clone(&self.maintenance_service),
            auth_service: Arc::clone(&self.auth_service),
            backup_service: Arc::clone(&self.backup_service),
            email_service: Arc::clone(&self.email_service),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<SR, MR, UR, LR, BR, ML> AppState<SR, MR, UR, LR, BR, ML> {
    /// Create a new application state from service instances, with an
    /// empty session store.
    pub fn new(
        site_service: SiteService<SR, UR>,
        machine_service: MachineService<MR, SR>,
        maintenance_service: MaintenanceService<LR, MR, SR>,
        auth_service: AuthService<UR>,
        backup_service: BackupService<BR>,
        email_service: EmailService<ML>,
    ) -> Self {
        Self::from_arcs(
            Arc::new(site_service),
            Arc::new(machine_service),
            Arc::new(maintenance_service),
            Arc::new(auth_service),
            Arc::new(backup_service),
            Arc::new(email_service),
        )
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when a service is also needed outside the HTTP layer, such
    /// as the auth service seeding the administrator at startup.
    pub fn from_arcs(
        site_service: Arc<SiteService<SR, UR>>,
        machine_service: Arc<MachineService<MR, SR>>,
        maintenance_service: Arc<MaintenanceService<LR, MR, SR>>,
        auth_service: Arc<AuthService<UR>>,
        backup_service: Arc<BackupService<BR>>,
        email_service: Arc<EmailService<ML>>,
    ) -> Self {
        Self {
            site_service,
            machine_service,
            maintenance_service,
            auth_service,
            backup_service,
            email_service,
            sessions: Arc::new(InProcessSessionStore::new()),
        }
    }
}
