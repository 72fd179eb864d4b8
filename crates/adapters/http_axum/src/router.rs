//! Axum router assembly.

use axum::Router;
use axum::http::Uri;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SiteRepository,
    UserRepository,
};
use maintrack_domain::error::{MaintrackError, NotFoundError};

use crate::error::DashboardError;
use crate::session;
use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the dashboard pages at `/` plus `/health`. Every request passes
/// through the session cookie middleware, and a [`TraceLayer`] logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<SR, MR, UR, LR, BR, ML>(state: AppState<SR, MR, UR, LR, BR, ML>) -> Router
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::dashboard::routes())
        .fallback(not_found)
        .layer(middleware::from_fn(session::assign_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> DashboardError {
    MaintrackError::from(NotFoundError {
        entity: "Page",
        id: uri.path().to_string(),
    })
    .into()
}
