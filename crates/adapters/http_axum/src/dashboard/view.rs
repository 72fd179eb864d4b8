//! View-model helpers shared by the page templates.
//!
//! Templates only ever see plain strings and flags: optional values are
//! turned into `""` or a placeholder here, never left for the markup.

use std::str::FromStr;

use axum::http::StatusCode;

use maintrack_app::ports::SessionStore;
use maintrack_app::session::InProcessSessionStore;
use maintrack_domain::error::MaintrackError;
use maintrack_domain::flash::Flash;
use maintrack_domain::id::SessionId;

use crate::error::DashboardError;

/// A flash message ready for rendering.
pub struct FlashView {
    /// Severity class: `success`, `info`, `warning` or `danger`.
    pub class: &'static str,
    pub message: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        Self {
            class: flash.level.css_class(),
            message: flash.message,
        }
    }
}

/// Drain the session's flash queue for the page being rendered.
pub fn flashes(sessions: &InProcessSessionStore, session: SessionId) -> Vec<FlashView> {
    sessions
        .take_flashes(session)
        .into_iter()
        .map(FlashView::from)
        .collect()
}

/// Queue the error flash for a failed submission and return the status the
/// re-rendered form is served with.
pub fn reject(
    sessions: &InProcessSessionStore,
    session: SessionId,
    err: &MaintrackError,
) -> StatusCode {
    let (status, message) = match err {
        MaintrackError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        MaintrackError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Invalid username or password.".to_string(),
        ),
        MaintrackError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
        MaintrackError::Storage(err) => {
            tracing::error!(error = %err, "storage error while handling form");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.".to_string(),
            )
        }
    };
    sessions.push_flash(session, Flash::error(message));
    status
}

/// Queue a success flash.
pub fn confirm(sessions: &InProcessSessionStore, session: SessionId, message: impl Into<String>) {
    sessions.push_flash(session, Flash::success(message));
}

/// One `<option>` of a select element.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl ToString, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
            selected,
        }
    }
}

/// HTML checkboxes only submit a value when ticked.
pub fn checked(value: &str) -> bool {
    !value.is_empty()
}

/// Render an optional value, substituting `placeholder` when it is absent.
pub fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

/// Parse a path identifier, answering 404 when it is malformed.
///
/// # Errors
///
/// Returns [`DashboardError`] (not found) when `raw` does not parse.
pub fn parse_id<T: FromStr>(entity: &'static str, raw: &str) -> Result<T, DashboardError> {
    T::from_str(raw).map_err(|_| DashboardError::invalid_id(entity, raw))
}
