//! Server-side rendered admin pages.
//!
//! Forms post back to the same path and follow the PRG pattern: success
//! queues a flash and redirects with `303 See Other`, failure queues an error
//! flash and re-renders the form with the submitted values.

pub mod backups;
pub mod home;
pub mod login;
pub mod machines;
pub mod maintenance;
pub mod sites;
pub mod test_email;
pub mod view;

use axum::Router;
use axum::routing::{get, post};

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SiteRepository,
    UserRepository,
};

use crate::state::AppState;

/// Build the dashboard sub-router for SSR HTML pages.
pub fn routes<SR, MR, UR, LR, BR, ML>() -> Router<AppState<SR, MR, UR, LR, BR, ML>>
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(home::index::<SR, MR, UR, LR, BR, ML>))
        .route(
            "/login",
            get(login::form::<SR, MR, UR, LR, BR, ML>).post(login::submit::<SR, MR, UR, LR, BR, ML>),
        )
        .route("/logout", post(login::logout::<SR, MR, UR, LR, BR, ML>))
        .route("/sites", get(sites::list::<SR, MR, UR, LR, BR, ML>))
        .route(
            "/sites/new",
            get(sites::new::<SR, MR, UR, LR, BR, ML>).post(sites::create::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/sites/{id}/edit",
            get(sites::edit::<SR, MR, UR, LR, BR, ML>).post(sites::update::<SR, MR, UR, LR, BR, ML>),
        )
        .route("/machines", get(machines::list::<SR, MR, UR, LR, BR, ML>))
        .route(
            "/machines/new",
            get(machines::new::<SR, MR, UR, LR, BR, ML>)
                .post(machines::create::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/machines/{id}/edit",
            get(machines::edit::<SR, MR, UR, LR, BR, ML>)
                .post(machines::update::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/machines/{id}/history",
            get(maintenance::history::<SR, MR, UR, LR, BR, ML>)
                .post(maintenance::record::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/parts",
            get(maintenance::parts::<SR, MR, UR, LR, BR, ML>)
                .post(maintenance::create_part::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/backups",
            get(backups::list::<SR, MR, UR, LR, BR, ML>).post(backups::create::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/backups/{id}/toggle",
            post(backups::toggle::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/backups/{id}/delete",
            post(backups::delete::<SR, MR, UR, LR, BR, ML>),
        )
        .route(
            "/admin/test-email",
            get(test_email::form::<SR, MR, UR, LR, BR, ML>)
                .post(test_email::send::<SR, MR, UR, LR, BR, ML>),
        )
}
