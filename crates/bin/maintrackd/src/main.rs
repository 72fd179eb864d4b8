//! # maintrackd: maintenance tracker daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Seed the administrator account
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use maintrack_adapter_http_axum::state::AppState;
use maintrack_adapter_storage_sqlite_sqlx::{
    Config as DbConfig, SqliteBackupScheduleRepository, SqliteMachineRepository,
    SqliteMaintenanceRepository, SqliteSiteRepository, SqliteUserRepository,
};
use maintrack_app::mailer::LogMailer;
use maintrack_app::services::auth_service::AuthService;
use maintrack_app::services::backup_service::BackupService;
use maintrack_app::services::email_service::EmailService;
use maintrack_app::services::machine_service::MachineService;
use maintrack_app::services::maintenance_service::MaintenanceService;
use maintrack_app::services::site_service::SiteService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading maintrack.toml")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DbConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("opening database")?;
    let pool = db.pool().clone();

    // Services
    let site_service = SiteService::new(
        SqliteSiteRepository::new(pool.clone()),
        SqliteUserRepository::new(pool.clone()),
    );
    let machine_service = MachineService::new(
        SqliteMachineRepository::new(pool.clone()),
        SqliteSiteRepository::new(pool.clone()),
    );
    let maintenance_service = MaintenanceService::new(
        SqliteMaintenanceRepository::new(pool.clone()),
        SqliteMachineRepository::new(pool.clone()),
        SqliteSiteRepository::new(pool.clone()),
    );
    let auth_service = AuthService::new(SqliteUserRepository::new(pool.clone()));
    let backup_service = BackupService::new(SqliteBackupScheduleRepository::new(pool));
    let email_service = EmailService::new(LogMailer::new(), config.mail.from.clone());

    let admin = auth_service
        .ensure_user(
            &config.admin.username,
            &config.admin.password,
            config.admin.full_name.clone(),
        )
        .await
        .context("seeding administrator account")?;
    tracing::info!(username = %admin.username, "administrator account ready");

    // HTTP
    let state = AppState::new(
        site_service,
        machine_service,
        maintenance_service,
        auth_service,
        backup_service,
        email_service,
    );
    let app = maintrack_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("maintrackd listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("maintrackd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown requested");
}
