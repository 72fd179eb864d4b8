//! Maintenance history list, the add-log form and the parts catalogue.

use askama::Template;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use chrono::NaiveDate;
use serde::Deserialize;

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SiteRepository,
    UserRepository,
};
use maintrack_app::services::maintenance_service::NewMaintenance;
use maintrack_domain::error::{self, MaintrackError, ValidationError};
use maintrack_domain::id::{MachineId, PartId, SessionId};
use maintrack_domain::machine::Machine;
use maintrack_domain::maintenance::{MaintenanceLog, MaintenancePart};
use maintrack_domain::time;

use super::view::{self, FlashView, SelectOption};
use crate::error::DashboardError;
use crate::state::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the history table. Missing optional values are replaced by
/// placeholders here so the template never sees an absent value.
pub struct LogRow {
    date: String,
    part: String,
    performed_by: String,
    invoice_number: String,
    notes: String,
}

impl From<MaintenanceLog> for LogRow {
    fn from(log: MaintenanceLog) -> Self {
        Self {
            date: log.maintenance_date.format(DATE_FORMAT).to_string(),
            invoice_number: view::or_placeholder(log.invoice_number.as_deref(), "N/A"),
            notes: view::or_placeholder(log.notes.as_deref(), "No notes"),
            part: log.part.name,
            performed_by: log.performed_by,
        }
    }
}

/// Machine history page with the add-log form.
#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    flashes: Vec<FlashView>,
    machine_id: String,
    machine: String,
    model: String,
    site: String,
    logs: Vec<LogRow>,
    parts: Vec<SelectOption>,
    maintenance_date: String,
    performed_by: String,
    invoice_number: String,
    notes: String,
}

impl IntoResponse for HistoryTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// Parts catalogue page.
#[derive(Template)]
#[template(path = "parts.html")]
pub struct PartsTemplate {
    flashes: Vec<FlashView>,
    parts: Vec<String>,
    name: String,
}

impl IntoResponse for PartsTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogForm {
    pub maintenance_date: String,
    pub part_id: String,
    pub performed_by: String,
    pub invoice_number: String,
    pub notes: String,
}

impl LogForm {
    fn blank() -> Self {
        Self {
            maintenance_date: time::today().format(DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    fn to_entry(&self) -> Result<NewMaintenance, MaintrackError> {
        let raw_date = error::required("maintenance_date", &self.maintenance_date)?;
        let maintenance_date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT).map_err(|_| {
            ValidationError::InvalidDate {
                field: "maintenance_date",
                value: raw_date.clone(),
            }
        })?;
        let raw_part = error::required("part_id", &self.part_id)?;
        let part_id = PartId::parse_reference("part_id", &raw_part)?;

        Ok(NewMaintenance {
            maintenance_date,
            part_id,
            performed_by: error::required("performed_by", &self.performed_by)?,
            invoice_number: error::optional(&self.invoice_number),
            notes: error::optional(&self.notes),
        })
    }

    fn into_template(
        self,
        flashes: Vec<FlashView>,
        machine: &Machine,
        site: String,
        logs: Vec<MaintenanceLog>,
        parts: &[MaintenancePart],
    ) -> HistoryTemplate {
        let parts = parts
            .iter()
            .map(|part| {
                let value = part.id.to_string();
                let selected = value == self.part_id;
                SelectOption::new(value, part.name.clone(), selected)
            })
            .collect();
        HistoryTemplate {
            flashes,
            machine_id: machine.id.to_string(),
            machine: machine.label(),
            model: machine.model.clone(),
            site,
            logs: logs.into_iter().map(LogRow::from).collect(),
            parts,
            maintenance_date: self.maintenance_date,
            performed_by: self.performed_by,
            invoice_number: self.invoice_number,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PartForm {
    pub name: String,
}

/// Load the history page data, then queue the flash for `failure` (if any)
/// so a failed load never strands it in the session.
async fn render_history<SR, MR, UR, LR, BR, ML>(
    state: &AppState<SR, MR, UR, LR, BR, ML>,
    session: SessionId,
    machine_id: MachineId,
    form: LogForm,
    failure: Option<&MaintrackError>,
) -> Result<Response, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let (machine, logs) = state
        .maintenance_service
        .machine_history(machine_id)
        .await?;
    let site = state.site_service.get_site(machine.site_id).await?;
    let parts = state.maintenance_service.list_parts().await?;

    let status = failure.map_or(StatusCode::OK, |err| {
        view::reject(&state.sessions, session, err)
    });
    let page = form.into_template(
        view::flashes(&state.sessions, session),
        &machine,
        site.name,
        logs,
        &parts,
    );
    Ok((status, page).into_response())
}

/// `GET /machines/{id}/history`
pub async fn history<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
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
    render_history(&state, session, machine_id, LogForm::blank(), None).await
}

/// `POST /machines/{id}/history`: append a log entry (PRG).
pub async fn record<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
    Form(form): Form<LogForm>,
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

    let result = match form.to_entry() {
        Ok(entry) => {
            state
                .maintenance_service
                .record_maintenance(machine_id, entry)
                .await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(log) => {
            view::confirm(
                &state.sessions,
                session,
                format!(
                    "Recorded {} maintenance on {}.",
                    log.part.name,
                    log.maintenance_date.format(DATE_FORMAT)
                ),
            );
            Ok(Redirect::to(&format!("/machines/{machine_id}/history")).into_response())
        }
        Err(MaintrackError::NotFound(err)) => Err(MaintrackError::NotFound(err).into()),
        Err(err) => {
            render_history(&state, session, machine_id, form, Some(&err)).await
        }
    }
}

/// `GET /parts`
pub async fn parts<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Result<PartsTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let parts = state.maintenance_service.list_parts().await?;

    Ok(PartsTemplate {
        flashes: view::flashes(&state.sessions, session),
        parts: parts.into_iter().map(|p| p.name).collect(),
        name: String::new(),
    })
}

/// `POST /parts`
pub async fn create_part<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<PartForm>,
) -> Result<Response, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let result = match MaintenancePart::new(form.name.trim()) {
        Ok(part) => state.maintenance_service.create_part(part).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(part) => {
            view::confirm(
                &state.sessions,
                session,
                format!("Part \"{}\" added.", part.name),
            );
            Ok(Redirect::to("/parts").into_response())
        }
        Err(err) => {
            let parts = state.maintenance_service.list_parts().await?;
            let status = view::reject(&state.sessions, session, &err);
            let page = PartsTemplate {
                flashes: view::flashes(&state.sessions, session),
                parts: parts.into_iter().map(|p| p.name).collect(),
                name: form.name,
            };
            Ok((status, page).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maintrack_domain::id::SiteId;

    fn machine() -> Machine {
        Machine::builder()
            .name("Press 1")
            .model("HX-200")
            .site_id(SiteId::new())
            .build()
            .unwrap()
    }

    fn render(logs: Vec<MaintenanceLog>) -> String {
        LogForm::blank()
            .into_template(Vec::new(), &machine(), "North Plant".to_string(), logs, &[])
            .to_string()
    }

    #[test]
    fn should_render_empty_state_instead_of_table_when_no_logs() {
        let html = render(Vec::new());
        assert!(html.contains("No maintenance has been recorded for this machine yet."));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn should_render_placeholders_for_missing_optional_fields() {
        let part = MaintenancePart::new("Belt").unwrap();
        let log = MaintenanceLog::builder()
            .machine_id(MachineId::new())
            .maintenance_date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
            .part(part)
            .performed_by("Tech A")
            .build()
            .unwrap();

        let html = render(vec![log]);

        assert!(html.contains("<td>2024-03-02</td>"));
        assert!(html.contains("<td>N/A</td>"));
        assert!(html.contains("<td>No notes</td>"));
    }

    #[test]
    fn should_reject_malformed_date() {
        let form = LogForm {
            maintenance_date: "02/03/2024".to_string(),
            part_id: PartId::new().to_string(),
            performed_by: "Tech A".to_string(),
            ..LogForm::default()
        };
        assert!(matches!(
            form.to_entry(),
            Err(MaintrackError::Validation(ValidationError::InvalidDate { .. }))
        ));
    }

    #[test]
    fn should_treat_blank_optional_fields_as_absent() {
        let form = LogForm {
            maintenance_date: "2024-03-02".to_string(),
            part_id: PartId::new().to_string(),
            performed_by: " Tech A ".to_string(),
            invoice_number: "  ".to_string(),
            notes: String::new(),
        };
        let entry = form.to_entry().unwrap();
        assert_eq!(entry.performed_by, "Tech A");
        assert!(entry.invoice_number.is_none());
        assert!(entry.notes.is_none());
    }
}
