//! End-to-end smoke tests for the full maintrackd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`, so no TCP port is bound.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use maintrack_adapter_http_axum::router;
use maintrack_adapter_http_axum::session::SESSION_COOKIE;
use maintrack_adapter_http_axum::state::AppState;
use maintrack_adapter_storage_sqlite_sqlx::{
    Config, SqliteBackupScheduleRepository, SqliteMachineRepository, SqliteMaintenanceRepository,
    SqliteSiteRepository, SqliteUserRepository,
};
use maintrack_app::mailer::LogMailer;
use maintrack_app::services::auth_service::AuthService;
use maintrack_app::services::backup_service::BackupService;
use maintrack_app::services::email_service::EmailService;
use maintrack_app::services::machine_service::MachineService;
use maintrack_app::services::maintenance_service::MaintenanceService;
use maintrack_app::services::site_service::SiteService;
use tower::ServiceExt;

/// Build a fully-wired router backed by an in-memory `SQLite` database, with
/// an `admin` / `secret` account already present.
async fn app() -> axum::Router {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    let pool = db.pool().clone();

    let auth_service = AuthService::new(SqliteUserRepository::new(pool.clone()));
    auth_service
        .ensure_user("admin", "secret", Some("Ada Admin".to_string()))
        .await
        .expect("admin should be seeded");

    let state = AppState::new(
        SiteService::new(
            SqliteSiteRepository::new(pool.clone()),
            SqliteUserRepository::new(pool.clone()),
        ),
        MachineService::new(
            SqliteMachineRepository::new(pool.clone()),
            SqliteSiteRepository::new(pool.clone()),
        ),
        MaintenanceService::new(
            SqliteMaintenanceRepository::new(pool.clone()),
            SqliteMachineRepository::new(pool.clone()),
            SqliteSiteRepository::new(pool.clone()),
        ),
        auth_service,
        BackupService::new(SqliteBackupScheduleRepository::new(pool)),
        EmailService::new(LogMailer::new(), "tracker@example.com"),
    );

    router::build(state)
}

const COOKIE: &str = "maintrack_session=7b0e0f4e-3c1a-4d52-9a43-2f1d5c8e6a10";

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, COOKIE)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, COOKIE)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Pull the UUID of the first edit link in a rendered list page.
fn edit_link_id(body: &str) -> String {
    let end = body.find("/edit\"").expect("edit link should be rendered");
    body[end - 36..end].to_string()
}

/// Pull the first UUID that follows `prefix` in a rendered page.
fn id_after(body: &str, prefix: &str) -> String {
    let start = body.find(prefix).expect("link should be rendered") + prefix.len();
    body[start..start + 36].to_string()
}

async fn create_site(app: &axum::Router, name: &str) -> String {
    let resp = app
        .clone()
        .oneshot(post(
            "/sites/new",
            &format!("name={name}&location=Hall+A&contact_email=&notification_threshold=30"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let list = body_text(app.clone().oneshot(get("/sites")).await.unwrap()).await;
    edit_link_id(&list)
}

async fn create_machine(app: &axum::Router, site_id: &str) -> String {
    let resp = app
        .clone()
        .oneshot(post(
            "/machines/new",
            &format!(
                "name=Lathe&model=L-200&machine_number=M-7&serial_number=SN-42&site_id={site_id}"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let list = body_text(app.clone().oneshot(get("/machines")).await.unwrap()).await;
    edit_link_id(&list)
}

// ---------------------------------------------------------------------------
// Health check & sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = app()
        .await
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "OK");
}

#[tokio::test]
async fn should_set_session_cookie_for_new_visitor() {
    let resp = app()
        .await
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with(SESSION_COOKIE));
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_reject_wrong_password_with_error_flash() {
    let resp = app()
        .await
        .oneshot(post("/login", "username=admin&password=wrong"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_text(resp).await;
    assert!(body.contains("Invalid username or password."));
    assert!(body.contains(r#"value="admin""#));
}

#[tokio::test]
async fn should_welcome_user_once_after_login() {
    let app = app().await;

    let resp = app
        .clone()
        .oneshot(post("/login", "username=admin&password=secret"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let first = body_text(app.clone().oneshot(get("/")).await.unwrap()).await;
    assert!(first.contains("Welcome back, Ada Admin."));

    let second = body_text(app.oneshot(get("/")).await.unwrap()).await;
    assert!(!second.contains("Welcome back"));
}

// ---------------------------------------------------------------------------
// Sites
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_preserve_threshold_when_edit_rejected() {
    let app = app().await;
    let site_id = create_site(&app, "North").await;

    let resp = app
        .clone()
        .oneshot(post(
            &format!("/sites/{site_id}/edit"),
            "name=North&location=Hall+A&contact_email=&notification_threshold=400",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(resp).await;
    assert!(body.contains("notification_threshold must be between 1 and 365, got 400"));

    let edit = body_text(
        app.oneshot(get(&format!("/sites/{site_id}/edit")))
            .await
            .unwrap(),
    )
    .await;
    assert!(edit.contains(r#"value="30""#));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_site() {
    let resp = app()
        .await
        .oneshot(get("/sites/7b0e0f4e-0000-4d52-9a43-2f1d5c8e6a10/edit"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Machines & history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_keep_machine_unchanged_when_resubmitted() {
    let app = app().await;
    let site_id = create_site(&app, "North").await;
    let machine_id = create_machine(&app, &site_id).await;

    let before = body_text(
        app.clone()
            .oneshot(get(&format!("/machines/{machine_id}/edit")))
            .await
            .unwrap(),
    )
    .await;

    let resp = app
        .clone()
        .oneshot(post(
            &format!("/machines/{machine_id}/edit"),
            &format!(
                "name=Lathe&model=L-200&machine_number=M-7&serial_number=SN-42&site_id={site_id}"
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let after = body_text(
        app.oneshot(get(&format!("/machines/{machine_id}/edit")))
            .await
            .unwrap(),
    )
    .await;
    assert!(after.contains(r#"value="SN-42""#));
    assert!(after.contains(r#"value="M-7""#));
    assert_eq!(
        before.matches(" selected").count(),
        after.matches(" selected").count()
    );
}

#[tokio::test]
async fn should_render_empty_history_without_table() {
    let app = app().await;
    let site_id = create_site(&app, "North").await;
    let machine_id = create_machine(&app, &site_id).await;

    let resp = app
        .oneshot(get(&format!("/machines/{machine_id}/history")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("No maintenance has been recorded for this machine yet."));
    assert!(!body.contains("<table"));
}

#[tokio::test]
async fn should_list_recorded_maintenance_with_placeholders() {
    let app = app().await;
    let site_id = create_site(&app, "North").await;
    let machine_id = create_machine(&app, &site_id).await;

    let resp = app
        .clone()
        .oneshot(post("/parts", "name=Drive+belt"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let parts = body_text(
        app.clone()
            .oneshot(get(&format!("/machines/{machine_id}/history")))
            .await
            .unwrap(),
    )
    .await;
    let part_id = id_after(&parts, r#"<option value=""#);

    let resp = app
        .clone()
        .oneshot(post(
            &format!("/machines/{machine_id}/history"),
            &format!(
                "maintenance_date=2024-03-01&part_id={part_id}&performed_by=Sam&invoice_number=&notes="
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = body_text(
        app.oneshot(get(&format!("/machines/{machine_id}/history")))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("<table"));
    assert!(body.contains("2024-03-01"));
    assert!(body.contains("Drive belt"));
    assert!(body.contains("N/A"));
    assert!(body.contains("No notes"));
}

// ---------------------------------------------------------------------------
// Backups & test email
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_list_created_backup_schedule() {
    let app = app().await;

    let resp = app
        .clone()
        .oneshot(post(
            "/backups",
            "name=Nightly&frequency=weekly&day_of_week=2&day_of_month=15&hour=3&minute=30&retention_count=999&include_users=on",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = body_text(app.oneshot(get("/backups")).await.unwrap()).await;
    assert!(body.contains("Nightly"));
    assert!(body.contains("Weekly on Wednesday at 03:30"));
    assert!(body.contains("Unlimited"));
}

#[tokio::test]
async fn should_reject_backup_with_unlisted_retention() {
    let resp = app()
        .await
        .oneshot(post(
            "/backups",
            "name=Nightly&frequency=daily&day_of_week=&day_of_month=&hour=3&minute=30&retention_count=4",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(resp).await;
    assert!(body.contains("No backup schedules have been configured."));
}

#[tokio::test]
async fn should_confirm_test_email_once() {
    let app = app().await;

    let resp = app
        .clone()
        .oneshot(post(
            "/admin/test-email",
            "email=ops%40example.com&subject=Hello&message=Ping&notification_threshold=7",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let first = body_text(app.clone().oneshot(get("/admin/test-email")).await.unwrap()).await;
    assert!(first.contains("Test email sent to ops@example.com."));

    let second = body_text(app.oneshot(get("/admin/test-email")).await.unwrap()).await;
    assert!(!second.contains("Test email sent"));
}
