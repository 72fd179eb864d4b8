//! Admin tool for sending a test email.

use askama::Template;
use axum::extract::{Extension, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use maintrack_app::ports::{
    BackupScheduleRepository, MachineRepository, Mailer, MaintenanceRepository, SiteRepository,
    UserRepository,
};
use maintrack_domain::error::{self, MaintrackError};
use maintrack_domain::id::SessionId;
use maintrack_domain::notification::{
    DEFAULT_TEST_SUBJECT, MAX_SAMPLE_THRESHOLD, MIN_SAMPLE_THRESHOLD, SampleReminder, TestEmail,
};

use super::view::{self, FlashView};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "test_email.html")]
pub struct TestEmailTemplate {
    flashes: Vec<FlashView>,
    email: String,
    subject: String,
    message: String,
    include_samples: bool,
    site_name: String,
    site_location: String,
    notification_threshold: String,
}

impl IntoResponse for TestEmailTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestEmailForm {
    pub email: String,
    pub subject: String,
    pub message: String,
    pub include_samples: String,
    pub site_name: String,
    pub site_location: String,
    pub notification_threshold: String,
}

impl TestEmailForm {
    fn blank() -> Self {
        Self {
            subject: DEFAULT_TEST_SUBJECT.to_string(),
            notification_threshold: "7".to_string(),
            ..Self::default()
        }
    }

    /// Sample fields are only validated when samples are requested.
    fn to_email(&self) -> Result<TestEmail, MaintrackError> {
        let sample = if view::checked(&self.include_samples) {
            let threshold = error::ranged(
                "notification_threshold",
                &self.notification_threshold,
                MIN_SAMPLE_THRESHOLD.into(),
                MAX_SAMPLE_THRESHOLD.into(),
            )?;
            Some(SampleReminder::new(
                &self.site_name,
                &self.site_location,
                u16::try_from(threshold).unwrap_or(MAX_SAMPLE_THRESHOLD),
            )?)
        } else {
            None
        };
        TestEmail::new(&self.email, &self.subject, &self.message, sample)
    }

    fn into_template(self, flashes: Vec<FlashView>) -> TestEmailTemplate {
        TestEmailTemplate {
            flashes,
            include_samples: view::checked(&self.include_samples),
            email: self.email,
            subject: self.subject,
            message: self.message,
            site_name: self.site_name,
            site_location: self.site_location,
            notification_threshold: self.notification_threshold,
        }
    }
}

/// `GET /admin/test-email`
pub async fn form<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
) -> TestEmailTemplate
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    TestEmailForm::blank().into_template(view::flashes(&state.sessions, session))
}

/// `POST /admin/test-email`
pub async fn send<SR, MR, UR, LR, BR, ML>(
    State(state): State<AppState<SR, MR, UR, LR, BR, ML>>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<TestEmailForm>,
) -> Response
where
    SR: SiteRepository + Send + Sync + 'static,
    MR: MachineRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    LR: MaintenanceRepository + Send + Sync + 'static,
    BR: BackupScheduleRepository + Send + Sync + 'static,
    ML: Mailer + Send + Sync + 'static,
{
    let email = match form.to_email() {
        Ok(email) => email,
        Err(err) => {
            let status = view::reject(&state.sessions, session, &err);
            let page = form.into_template(view::flashes(&state.sessions, session));
            return (status, page).into_response();
        }
    };

    match state.email_service.send_test_email(&email).await {
        Ok(()) => {
            view::confirm(
                &state.sessions,
                session,
                format!("Test email sent to {}.", email.to),
            );
            Redirect::to("/admin/test-email").into_response()
        }
        Err(err) => {
            let status = view::reject(&state.sessions, session, &err);
            let page = form.into_template(view::flashes(&state.sessions, session));
            (status, page).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maintrack_domain::error::ValidationError;

    #[test]
    fn should_require_recipient() {
        let form = TestEmailForm::blank();
        assert!(matches!(
            form.to_email(),
            Err(MaintrackError::Validation(ValidationError::Required { field: "email" }))
        ));
    }

    #[test]
    fn should_ignore_sample_fields_when_samples_not_requested() {
        let form = TestEmailForm {
            email: "ops@example.com".to_string(),
            notification_threshold: "99".to_string(),
            ..TestEmailForm::blank()
        };
        let email = form.to_email().unwrap();
        assert!(email.sample.is_none());
        assert_eq!(email.subject, DEFAULT_TEST_SUBJECT);
    }

    #[test]
    fn should_reject_sample_threshold_above_thirty() {
        let form = TestEmailForm {
            email: "ops@example.com".to_string(),
            include_samples: "on".to_string(),
            notification_threshold: "31".to_string(),
            ..TestEmailForm::blank()
        };
        assert!(matches!(
            form.to_email(),
            Err(MaintrackError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn should_default_blank_sample_site_values() {
        let form = TestEmailForm {
            email: "ops@example.com".to_string(),
            include_samples: "on".to_string(),
            ..TestEmailForm::blank()
        };
        let sample = form.to_email().unwrap().sample.unwrap();
        assert_eq!(sample.site_name, "Sample Site");
        assert_eq!(sample.notification_threshold, 7);
    }
}
