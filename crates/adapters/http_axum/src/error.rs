//! HTTP error response mapping.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use maintrack_domain::error::{MaintrackError, NotFoundError};

/// Stand-alone error page; it does not consume the session's flashes.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage {
    status: u16,
    reason: &'static str,
    message: String,
}

/// Maps [`MaintrackError`] to an HTML error page with an appropriate status
/// code. Storage details are logged, never shown.
#[derive(Debug)]
pub struct DashboardError(MaintrackError);

impl DashboardError {
    /// Error for a path segment that is not a well-formed identifier.
    pub fn invalid_id(entity: &'static str, raw: &str) -> Self {
        Self(
            NotFoundError {
                entity,
                id: raw.to_string(),
            }
            .into(),
        )
    }
}

impl From<MaintrackError> for DashboardError {
    fn from(err: MaintrackError) -> Self {
        Self(err)
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            MaintrackError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            MaintrackError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            MaintrackError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.0.to_string())
            }
            MaintrackError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again later.".to_string(),
                )
            }
        };

        let page = ErrorPage {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "failed to render error page");
                (status, page.reason).into_response()
            }
        }
    }
}
