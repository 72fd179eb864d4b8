//! Machine list and edit forms.

use std::collections::HashMap;

use askama::Template;
use axum::extract::{Extension, Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SiteRepository,
    UserRepository,
};
use maintrack_domain::error::{self, MaintrackError};
use maintrack_domain::id::{MachineId, SessionId, SiteId};
use maintrack_domain::machine::Machine;
use maintrack_domain::site::Site;

use super::view::{self, FlashView, SelectOption};
use crate::error::DashboardError;
use crate::state::AppState;

pub struct MachineRow {
    id: String,
    name: String,
    model: String,
    machine_number: String,
    serial_number: String,
    site: String,
}

/// Machine list page template.
#[derive(Template)]
#[template(path = "machine_list.html")]
pub struct MachineListTemplate {
    flashes: Vec<FlashView>,
    machines: Vec<MachineRow>,
}

impl IntoResponse for MachineListTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// Machine new/edit form template.
#[derive(Template)]
#[template(path = "machine_form.html")]
pub struct MachineFormTemplate {
    flashes: Vec<FlashView>,
    heading: String,
    action: String,
    name: String,
    model: String,
    machine_number: String,
    serial_number: String,
    sites: Vec<SelectOption>,
}

impl IntoResponse for MachineFormTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MachineForm {
    pub name: String,
    pub model: String,
    pub machine_number: String,
    pub serial_number: String,
    pub site_id: String,
}

impl MachineForm {
    fn from_machine(machine: &Machine) -> Self {
        Self {
            name: machine.name.clone(),
            model: machine.model.clone(),
            machine_number: machine.machine_number.clone().unwrap_or_default(),
            serial_number: machine.serial_number.clone().unwrap_or_default(),
            site_id: machine.site_id.to_string(),
        }
    }

    /// Validate the submission into a [`Machine`] carrying `id`. Whether the
    /// site exists is checked by the service.
    fn to_machine(&self, id: MachineId) -> Result<Machine, MaintrackError> {
        let raw_site = error::required("site_id", &self.site_id)?;
        let site_id = SiteId::parse_reference("site_id", &raw_site)?;

        let mut builder = Machine::builder()
            .id(id)
            .name(self.name.trim())
            .model(self.model.trim())
            .site_id(site_id);
        if let Some(number) = error::optional(&self.machine_number) {
            builder = builder.machine_number(number);
        }
        if let Some(serial) = error::optional(&self.serial_number) {
            builder = builder.serial_number(serial);
        }
        builder.build()
    }

    fn into_template(
        self,
        flashes: Vec<FlashView>,
        heading: String,
        action: String,
        sites: &[Site],
    ) -> MachineFormTemplate {
        let sites = sites
            .iter()
            .map(|site| {
                let value = site.id.to_string();
                let selected = value == self.site_id;
                SelectOption::new(value, site.name.clone(), selected)
            })
            .collect();
        MachineFormTemplate {
            flashes,
            heading,
            action,
            name: self.name,
            model: self.model,
            machine_number: self.machine_number,
            serial_number: self.serial_number,
            sites,
        }
    }
}

/// `GET /machines`
pub async fn list<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Result<MachineListTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let machines = state.machine_service.list_machines().await?;
    let site_names: HashMap<SiteId, String> = state
        .site_service
        .list_sites()
        .await?
        .into_iter()
        .map(|site| (site.id, site.name))
        .collect();

    let machines = machines
        .into_iter()
        .map(|machine| MachineRow {
            id: machine.id.to_string(),
            site: site_names
                .get(&machine.site_id)
                .cloned()
                .unwrap_or_default(),
            machine_number: machine.machine_number.unwrap_or_default(),
            serial_number: machine.serial_number.unwrap_or_default(),
            name: machine.name,
            model: machine.model,
        })
        .collect();

    Ok(MachineListTemplate {
        flashes: view::flashes(&state.sessions, session),
        machines,
    })
}

/// `GET /machines/new`
pub async fn new<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Result<MachineFormTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let sites = state.site_service.list_sites().await?;

    Ok(MachineForm::default().into_template(
        view::flashes(&state.sessions, session),
        "New machine".to_string(),
        "/machines/new".to_string(),
        &sites,
    ))
}

/// `POST /machines/new`
pub async fn create<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<MachineForm>,
) -> Result<Response, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let result = match form.to_machine(MachineId::new()) {
        Ok(machine) => state.machine_service.create_machine(machine).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(machine) => {
            view::confirm(
                &state.sessions,
                session,
                format!("Machine \"{}\" created.", machine.label()),
            );
            Ok(Redirect::to("/machines").into_response())
        }
        Err(err) => {
            let sites = state.site_service.list_sites().await?;
            let status = view::reject(&state.sessions, session, &err);
            let page = form.into_template(
                view::flashes(&state.sessions, session),
                "New machine".to_string(),
                "/machines/new".to_string(),
                &sites,
            );
            Ok((status, page).into_response())
        }
    }
}

/// `GET /machines/{id}/edit`
pub async fn edit<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<MachineFormTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let machine_id: MachineId = view::parse_id("Machine", &id)?;
    let machine = state.machine_service.get_machine(machine_id).await?;
    let sites = state.site_service.list_sites().await?;

    Ok(MachineForm::from_machine(&machine).into_template(
        view::flashes(&state.sessions, session),
        format!("Edit machine {}", machine.label()),
        format!("/machines/{machine_id}/edit"),
        &sites,
    ))
}

/// `POST /machines/{id}/edit`
pub async fn update<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
    Form(form): Form<MachineForm>,
) -> Result<Response, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let machine_id: MachineId = view::parse_id("Machine", &id)?;
    let existing = state.machine_service.get_machine(machine_id).await?;

    let result = match form.to_machine(machine_id) {
        Ok(machine) => state.machine_service.update_machine(machine).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(machine) => {
            view::confirm(
                &state.sessions,
                session,
                format!("Machine \"{}\" updated.", machine.label()),
            );
            Ok(Redirect::to("/machines").into_response())
        }
        Err(err) => {
            let sites = state.site_service.list_sites().await?;
            let status = view::reject(&state.sessions, session, &err);
            let page = form.into_template(
                view::flashes(&state.sessions, session),
                format!("Edit machine {}", existing.label()),
                format!("/machines/{machine_id}/edit"),
                &sites,
            );
            Ok((status, page).into_response())
        }
    }
}
