//! Site list and edit forms.

use askama::Template;
use axum::extract::{Extension, Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SiteRepository,
    UserRepository,
};
use maintrack_domain::email::EmailAddress;
use maintrack_domain::error::{self, MaintrackError};
use maintrack_domain::id::{SessionId, SiteId, UserId};
use maintrack_domain::site::{
    DEFAULT_NOTIFICATION_THRESHOLD, MAX_NOTIFICATION_THRESHOLD, MIN_NOTIFICATION_THRESHOLD, Site,
};
use maintrack_domain::user::User;

use super::view::{self, FlashView, SelectOption};
use crate::error::DashboardError;
use crate::state::AppState;

pub struct SiteRow {
    id: String,
    name: String,
    location: String,
    contact_email: String,
    threshold: u16,
    notifications: &'static str,
    member_count: usize,
}

impl From<Site> for SiteRow {
    fn from(site: Site) -> Self {
        Self {
            id: site.id.to_string(),
            contact_email: site
                .contact_email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            threshold: site.notification_threshold,
            notifications: if site.enable_notifications { "On" } else { "Off" },
            member_count: site.user_ids.len(),
            name: site.name,
            location: site.location,
        }
    }
}

/// Site list page template.
#[derive(Template)]
#[template(path = "site_list.html")]
pub struct SiteListTemplate {
    flashes: Vec<FlashView>,
    sites: Vec<SiteRow>,
}

impl IntoResponse for SiteListTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// Site new/edit form template.
#[derive(Template)]
#[template(path = "site_form.html")]
pub struct SiteFormTemplate {
    flashes: Vec<FlashView>,
    heading: String,
    action: String,
    name: String,
    location: String,
    contact_email: String,
    notification_threshold: String,
    enable_notifications: bool,
    users: Vec<SelectOption>,
}

impl IntoResponse for SiteFormTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// Submitted site form. Every field is kept as text so it can be echoed
/// back unchanged when validation fails.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteForm {
    pub name: String,
    pub location: String,
    pub contact_email: String,
    pub notification_threshold: String,
    pub enable_notifications: String,
    pub user_ids: Vec<String>,
}

impl SiteForm {
    fn from_site(site: &Site) -> Self {
        Self {
            name: site.name.clone(),
            location: site.location.clone(),
            contact_email: site
                .contact_email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            notification_threshold: site.notification_threshold.to_string(),
            enable_notifications: if site.enable_notifications {
                "on".to_string()
            } else {
                String::new()
            },
            user_ids: site.user_ids.iter().map(ToString::to_string).collect(),
        }
    }

    /// Validate the submission into a [`Site`] carrying `id`.
    fn to_site(&self, id: SiteId) -> Result<Site, MaintrackError> {
        let name = error::required("name", &self.name)?;
        let threshold = error::ranged(
            "notification_threshold",
            &self.notification_threshold,
            MIN_NOTIFICATION_THRESHOLD.into(),
            MAX_NOTIFICATION_THRESHOLD.into(),
        )?;
        let user_ids = self
            .user_ids
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| UserId::parse_reference("user_ids", raw))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = Site::builder()
            .id(id)
            .name(name)
            .location(self.location.trim())
            .notification_threshold(u16::try_from(threshold).unwrap_or(DEFAULT_NOTIFICATION_THRESHOLD))
            .enable_notifications(view::checked(&self.enable_notifications))
            .users(user_ids);
        if let Some(email) = error::optional(&self.contact_email) {
            builder = builder.contact_email(EmailAddress::parse(&email)?);
        }
        builder.build()
    }

    fn into_template(
        self,
        flashes: Vec<FlashView>,
        heading: String,
        action: String,
        users: &[User],
    ) -> SiteFormTemplate {
        let users = users
            .iter()
            .map(|user| {
                let value = user.id.to_string();
                let selected = self.user_ids.contains(&value);
                SelectOption::new(value, user.display_name(), selected)
            })
            .collect();
        SiteFormTemplate {
            flashes,
            heading,
            action,
            enable_notifications: view::checked(&self.enable_notifications),
            name: self.name,
            location: self.location,
            contact_email: self.contact_email,
            notification_threshold: self.notification_threshold,
            users,
        }
    }
}

/// `GET /sites`
pub async fn list<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Result<SiteListTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let sites = state.site_service.list_sites().await?;

    Ok(SiteListTemplate {
        flashes: view::flashes(&state.sessions, session),
        sites: sites.into_iter().map(SiteRow::from).collect(),
    })
}

/// `GET /sites/new`
pub async fn new<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Result<SiteFormTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let users = state.auth_service.list_users().await?;
    let form = SiteForm {
        notification_threshold: DEFAULT_NOTIFICATION_THRESHOLD.to_string(),
        ..SiteForm::default()
    };

    Ok(form.into_template(
        view::flashes(&state.sessions, session),
        "New site".to_string(),
        "/sites/new".to_string(),
        &users,
    ))
}

/// `POST /sites/new`
pub async fn create<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<SiteForm>,
) -> Result<Response, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let result = match form.to_site(SiteId::new()) {
        Ok(site) => state.site_service.create_site(site).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(site) => {
            view::confirm(
                &state.sessions,
                session,
                format!("Site \"{}\" created.", site.name),
            );
            Ok(Redirect::to("/sites").into_response())
        }
        Err(err) => {
            let users = state.auth_service.list_users().await?;
            let status = view::reject(&state.sessions, session, &err);
            let page = form.into_template(
                view::flashes(&state.sessions, session),
                "New site".to_string(),
                "/sites/new".to_string(),
                &users,
            );
            Ok((status, page).into_response())
        }
    }
}

/// `GET /sites/{id}/edit`
pub async fn edit<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<SiteFormTemplate, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let site_id: SiteId = view::parse_id("Site", &id)?;
    let site = state.site_service.get_site(site_id).await?;
    let users = state.auth_service.list_users().await?;

    Ok(SiteForm::from_site(&site).into_template(
        view::flashes(&state.sessions, session),
        format!("Edit site {}", site.name),
        format!("/sites/{site_id}/edit"),
        &users,
    ))
}

/// `POST /sites/{id}/edit`
pub async fn update<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
    Form(form): Form<SiteForm>,
) -> Result<Response, DashboardError>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let site_id: SiteId = view::parse_id("Site", &id)?;
    let existing = state.site_service.get_site(site_id).await?;

    let result = match form.to_site(site_id) {
        Ok(site) => state.site_service.update_site(site).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(site) => {
            view::confirm(
                &state.sessions,
                session,
                format!("Site \"{}\" updated.", site.name),
            );
            Ok(Redirect::to("/sites").into_response())
        }
        Err(err) => {
            let users = state.auth_service.list_users().await?;
            let status = view::reject(&state.sessions, session, &err);
            let page = form.into_template(
                view::flashes(&state.sessions, session),
                format!("Edit site {}", existing.name),
                format!("/sites/{site_id}/edit"),
                &users,
            );
            Ok((status, page).into_response())
        }
    }
}
