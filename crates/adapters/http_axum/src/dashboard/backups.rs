//! Backup schedule list and configuration form.
//!
//! The day-of-week and day-of-month selectors are mutually exclusive. Which
//! one is visible is decided here from [`Frequency::visible_day_field`]; the
//! inline script in the template only repeats that rule when the frequency
//! select changes.

use std::str::FromStr;

use askama::Template;
use axum::extract::{Extension, Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SiteRepository,
    UserRepository,
};
use maintrack_domain::backup::{
    BackupSchedule, DayField, Frequency, MINUTE_STEP, RETENTION_CHOICES, Retention, weekday_name,
};
use maintrack_domain::error::{self, MaintrackError};
use maintrack_domain::id::{BackupScheduleId, SessionId};
use maintrack_domain::time;

use super::view::{self, FlashView, SelectOption};
use crate::error::DashboardError;
use crate::state::AppState;

pub struct ScheduleRow {
    id: String,
    name: String,
    recurrence: String,
    retention: String,
    include_users: &'static str,
    next_run: String,
    toggle_label: &'static str,
}

impl From<BackupSchedule> for ScheduleRow {
    fn from(schedule: BackupSchedule) -> Self {
        let next_run = if schedule.enabled {
            schedule
                .next_run_after(time::now().naive_utc())
                .format("%Y-%m-%d %H:%M UTC")
                .to_string()
        } else {
            "Paused".to_string()
        };
        Self {
            id: schedule.id.to_string(),
            recurrence: schedule.describe(),
            retention: schedule.retention.label(),
            include_users: if schedule.include_users { "Yes" } else { "No" },
            next_run,
            toggle_label: if schedule.enabled { "Pause" } else { "Resume" },
            name: schedule.name,
        }
    }
}

/// Backup schedules page: list plus creation form.
#[derive(Template)]
#[template(path = "backups.html")]
pub struct BackupsTemplate {
    flashes: Vec<FlashView>,
    schedules: Vec<ScheduleRow>,
    name: String,
    frequencies: Vec<SelectOption>,
    show_day_of_week: bool,
    show_day_of_month: bool,
    visibility_class: &'static str,
    days_of_week: Vec<SelectOption>,
    days_of_month: Vec<SelectOption>,
    hours: Vec<SelectOption>,
    minutes: Vec<SelectOption>,
    retentions: Vec<SelectOption>,
    include_users: bool,
}

impl IntoResponse for BackupsTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackupForm {
    pub name: String,
    pub frequency: String,
    pub day_of_week: String,
    pub day_of_month: String,
    pub hour: String,
    pub minute: String,
    pub retention_count: String,
    pub include_users: String,
}

fn small(value: i64) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

impl BackupForm {
    fn blank() -> Self {
        Self {
            frequency: Frequency::Daily.to_string(),
            day_of_week: "0".to_string(),
            day_of_month: "1".to_string(),
            hour: "2".to_string(),
            minute: "0".to_string(),
            retention_count: Retention::default().count().to_string(),
            ..Self::default()
        }
    }

    /// Validate the submission. Only the day field matching the frequency is
    /// read; the other one is ignored whatever it contains.
    fn to_schedule(&self) -> Result<BackupSchedule, MaintrackError> {
        let frequency = Frequency::from_str(&self.frequency)?;
        let (day_of_week, day_of_month) = match frequency.visible_day_field() {
            DayField::None => (None, None),
            DayField::DayOfWeek => (
                Some(small(error::ranged("day_of_week", &self.day_of_week, 0, 6)?)),
                None,
            ),
            DayField::DayOfMonth => (
                None,
                Some(small(error::ranged(
                    "day_of_month",
                    &self.day_of_month,
                    1,
                    31,
                )?)),
            ),
        };
        let hour = small(error::ranged("hour", &self.hour, 0, 23)?);
        let minute = small(error::ranged("minute", &self.minute, 0, 55)?);
        let count = error::ranged("retention_count", &self.retention_count, 1, 999)?;
        let retention = Retention::from_count(u16::try_from(count).unwrap_or(u16::MAX))?;

        BackupSchedule::builder()
            .name(self.name.trim())
            .frequency(frequency)
            .day_of_week(day_of_week)
            .day_of_month(day_of_month)
            .time(hour, minute)
            .retention(retention)
            .include_users(view::checked(&self.include_users))
            .build()
    }

    fn into_template(self, flashes: Vec<FlashView>, schedules: Vec<BackupSchedule>) -> BackupsTemplate {
        let selected_frequency = Frequency::from_str(&self.frequency).unwrap_or_default();
        let day_field = selected_frequency.visible_day_field();
        let options = |values: Vec<(String, String)>, current: &str| -> Vec<SelectOption> {
            values
                .into_iter()
                .map(|(value, label)| {
                    let selected = value == current.trim();
                    SelectOption::new(value, label, selected)
                })
                .collect()
        };

        BackupsTemplate {
            flashes,
            schedules: schedules.into_iter().map(ScheduleRow::from).collect(),
            frequencies: Frequency::ALL
                .iter()
                .map(|f| {
                    let label = match f {
                        Frequency::Daily => "Daily",
                        Frequency::Weekly => "Weekly",
                        Frequency::Monthly => "Monthly",
                    };
                    SelectOption::new(f.as_str(), label, *f == selected_frequency)
                })
                .collect(),
            show_day_of_week: day_field == DayField::DayOfWeek,
            show_day_of_month: day_field == DayField::DayOfMonth,
            visibility_class: match day_field {
                DayField::None => "",
                DayField::DayOfWeek => "weekly-visible",
                DayField::DayOfMonth => "monthly-visible",
            },
            days_of_week: options(
                (0..7u8)
                    .map(|d| (d.to_string(), weekday_name(d).unwrap_or_default().to_string()))
                    .collect(),
                &self.day_of_week,
            ),
            days_of_month: options(
                (1..=31u8).map(|d| (d.to_string(), d.to_string())).collect(),
                &self.day_of_month,
            ),
            hours: options(
                (0..24u8).map(|h| (h.to_string(), format!("{h:02}"))).collect(),
                &self.hour,
            ),
            minutes: options(
                (0..60u8)
                    .step_by(usize::from(MINUTE_STEP))
                    .map(|m| (m.to_string(), format!("{m:02}")))
                    .collect(),
                &self.minute,
            ),
            retentions: options(
                RETENTION_CHOICES
                    .iter()
                    .map(|&n| {
                        let label = Retention::from_count(n)
                            .map(Retention::label)
                            .unwrap_or_default();
                        (n.to_string(), label)
                    })
                    .collect(),
                &self.retention_count,
            ),
            include_users: view::checked(&self.include_users),
            name: self.name,
        }
    }
}

/// `GET /backups`
pub async fn list<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Result<BackupsTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let schedules = state.backup_service.list_schedules().await?;

    Ok(BackupForm::blank().into_template(view::flashes(&state.sessions, session), schedules))
}

/// `POST /backups`
pub async fn create<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<BackupForm>,
) -> Result<Response, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let result = match form.to_schedule() {
        Ok(schedule) => state.backup_service.create_schedule(schedule).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(schedule) => {
            view::confirm(
                &state.sessions,
                session,
                format!(
                    "Backup schedule \"{}\" created: {}.",
                    schedule.name,
                    schedule.describe()
                ),
            );
            Ok(Redirect::to("/backups").into_response())
        }
        Err(err) => {
            let schedules = state.backup_service.list_schedules().await?;
            let status = view::reject(&state.sessions, session, &err);
            let page = form.into_template(view::flashes(&state.sessions, session), schedules);
            Ok((status, page).into_response())
        }
    }
}

/// `POST /backups/{id}/toggle`: pause or resume.
pub async fn toggle<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<Redirect, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let schedule_id: BackupScheduleId = view::parse_id("Backup schedule", &id)?;
    let current = state.backup_service.get_schedule(schedule_id).await?;
    let updated = state
        .backup_service
        .set_enabled(schedule_id, !current.enabled)
        .await?;

    let verb = if updated.enabled { "resumed" } else { "paused" };
    view::confirm(
        &state.sessions,
        session,
        format!("Backup schedule \"{}\" {verb}.", updated.name),
    );
    Ok(Redirect::to("/backups"))
}

/// `POST /backups/{id}/delete`
pub async fn delete<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<Redirect, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let schedule_id: BackupScheduleId = view::parse_id("Backup schedule", &id)?;
    let schedule = state.backup_service.get_schedule(schedule_id).await?;
    state.backup_service.delete_schedule(schedule_id).await?;

    view::confirm(
        &state.sessions,
        session,
        format!("Backup schedule \"{}\" deleted.", schedule.name),
    );
    Ok(Redirect::to("/backups"))
}
