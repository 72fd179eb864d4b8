//! Login and logout.
//!
//! Logging in only records the user against the session; pages are not
//! gated on it.

use askama::Template;
use axum::extract::{Extension, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SessionStore,
    SiteRepository, UserRepository,
};
use maintrack_domain::flash::Flash;
use maintrack_domain::id::SessionId;

use super::view::{self, FlashView};
use crate::state::AppState;

/// Login form template. The password is never echoed back.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    flashes: Vec<FlashView>,
    username: String,
}

impl IntoResponse for LoginTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `GET /login`
pub async fn form<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> LoginTemplate
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    LoginTemplate {
        flashes: view::flashes(&state.sessions, session),
        username: String::new(),
    }
}

/// `POST /login`: check credentials, then redirect home (PRG).
pub async fn submit<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<LoginForm>,
) -> Response
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    match state
        .auth_service
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            state.sessions.login(session, user.id);
            view::confirm(
                &state.sessions,
                session,
                format!("Welcome back, {}.", user.display_name()),
            );
            Redirect::to("/").into_response()
        }
        Err(err) => {
            let status = view::reject(&state.sessions, session, &err);
            let page = LoginTemplate {
                flashes: view::flashes(&state.sessions, session),
                username: form.username,
            };
            (status, page).into_response()
        }
    }
}

/// `POST /logout`
pub async fn logout<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> Redirect
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    state.sessions.logout(session);
    state
        .sessions
        .push_flash(session, Flash::info("You have been logged out."));
    Redirect::to("/login")
}
