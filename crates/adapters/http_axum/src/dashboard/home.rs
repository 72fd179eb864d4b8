//! Dashboard home page: counts and machines due for maintenance.

use askama::Template;
use axum::extract::{Extension, State};
use axum::response::{Html, IntoResponse, Response};

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SessionStore,
    SiteRepository, UserRepository,
};
use maintrack_app::services::maintenance_service::DueMachine;
use maintrack_domain::id::SessionId;
use maintrack_domain::notification::MaintenanceStatus;
use maintrack_domain::time;

use super::view::{self, FlashView};
use crate::error::DashboardError;
use crate::state::AppState;

pub struct DueRow {
    machine_id: String,
    machine: String,
    site: String,
    status: String,
}

impl From<DueMachine> for DueRow {
    fn from(due: DueMachine) -> Self {
        let status = match due.status {
            MaintenanceStatus::NeverServiced => "Never serviced".to_string(),
            MaintenanceStatus::Due {
                overdue_days: 0, ..
            } => "Due today".to_string(),
            MaintenanceStatus::Due { due, overdue_days } => {
                format!("Overdue by {overdue_days} day(s) (due {due})")
            }
            MaintenanceStatus::Ok { due } => format!("Next due {due}"),
        };
        Self {
            machine_id: due.machine.id.to_string(),
            machine: due.machine.label(),
            site: due.site_name,
            status,
        }
    }
}

/// Home page template.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    flashes: Vec<FlashView>,
    current_user: Option<String>,
    site_count: usize,
    machine_count: usize,
    schedule_count: usize,
    due: Vec<DueRow>,
}

impl IntoResponse for HomeTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// `GET /`: overview.
pub async fn index<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Result<HomeTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let current_user = match state.sessions.current_user(session) {
        Some(id) => Some(
            state
                .auth_service
                .get_user(id)
                .await?
                .display_name()
                .to_string(),
        ),
        None => None,
    };
    let sites = state.site_service.list_sites().await?;
    let machines = state.machine_service.list_machines().await?;
    let schedules = state.backup_service.list_schedules().await?;
    let due = state
        .maintenance_service
        .due_report(time::today())
        .await?;

    Ok(HomeTemplate {
        flashes: view::flashes(&state.sessions, session),
        current_user,
        site_count: sites.len(),
        machine_count: machines.len(),
        schedule_count: schedules.len(),
        due: due.into_iter().map(DueRow::from).collect(),
    })
}
