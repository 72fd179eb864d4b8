//! Maintenance reminders and the admin test email.

use chrono::Days;
use serde::{Deserialize, Serialize};

use crate::email::EmailAddress;
use crate::error::{MaintrackError, ValidationError};
use crate::time::Date;

/// Subject used when the test-email form leaves it blank.
pub const DEFAULT_TEST_SUBJECT: &str = "Maintenance Tracker test email";
/// Smallest threshold accepted for sample reminders, in days.
pub const MIN_SAMPLE_THRESHOLD: u16 = 1;
/// Largest threshold accepted for sample reminders, in days.
pub const MAX_SAMPLE_THRESHOLD: u16 = 30;

/// Maintenance status of a machine relative to its site's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceStatus {
    /// No maintenance has ever been recorded.
    NeverServiced,
    /// Next maintenance falls due on `due`.
    Ok { due: Date },
    /// Maintenance was due `overdue_days` ago (0 means due today).
    Due { due: Date, overdue_days: i64 },
}

impl MaintenanceStatus {
    /// Evaluate the status of a machine last serviced on `last`.
    #[must_use]
    pub fn evaluate(last: Option<Date>, threshold_days: u16, today: Date) -> Self {
        let Some(last) = last else {
            return Self::NeverServiced;
        };
        let due = due_date(last, threshold_days);
        if due > today {
            Self::Ok { due }
        } else {
            Self::Due {
                due,
                overdue_days: (today - due).num_days(),
            }
        }
    }

    /// Whether the machine should be reported to the site contact.
    #[must_use]
    pub fn needs_attention(self) -> bool {
        !matches!(self, Self::Ok { .. })
    }
}

/// Date the next maintenance falls due.
#[must_use]
pub fn due_date(last: Date, threshold_days: u16) -> Date {
    last.checked_add_days(Days::new(threshold_days.into()))
        .unwrap_or(Date::MAX)
}

/// Sample site values included in a test email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleReminder {
    pub site_name: String,
    pub site_location: String,
    pub notification_threshold: u16,
}

impl SampleReminder {
    /// Build a sample reminder, defaulting blank site values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] when the threshold is outside
    /// `1..=30`.
    pub fn new(
        site_name: &str,
        site_location: &str,
        notification_threshold: u16,
    ) -> Result<Self, ValidationError> {
        if !(MIN_SAMPLE_THRESHOLD..=MAX_SAMPLE_THRESHOLD).contains(&notification_threshold) {
            return Err(ValidationError::OutOfRange {
                field: "notification_threshold",
                min: MIN_SAMPLE_THRESHOLD.into(),
                max: MAX_SAMPLE_THRESHOLD.into(),
                value: notification_threshold.into(),
            });
        }
        Ok(Self {
            site_name: non_blank_or(site_name, "Sample Site"),
            site_location: non_blank_or(site_location, "Sample Location"),
            notification_threshold,
        })
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// An email sent from the admin tooling to check mail configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEmail {
    pub to: EmailAddress,
    pub subject: String,
    pub message: String,
    pub sample: Option<SampleReminder>,
}

impl TestEmail {
    /// Assemble a test email.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when `to` is blank or malformed.
    pub fn new(
        to: &str,
        subject: &str,
        message: &str,
        sample: Option<SampleReminder>,
    ) -> Result<Self, MaintrackError> {
        if to.trim().is_empty() {
            return Err(ValidationError::Required { field: "email" }.into());
        }
        Ok(Self {
            to: EmailAddress::parse(to)?,
            subject: non_blank_or(subject, DEFAULT_TEST_SUBJECT),
            message: message.trim().to_string(),
            sample,
        })
    }

    /// Plain-text body: the admin message plus an optional sample reminder.
    #[must_use]
    pub fn body(&self) -> String {
        let mut body = if self.message.is_empty() {
            "This is a test email from Maintenance Tracker.".to_string()
        } else {
            self.message.clone()
        };
        if let Some(sample) = &self.sample {
            body.push_str("\n\n--- Sample maintenance reminder ---\n");
            body.push_str(&format!(
                "Site: {}\nLocation: {}\n",
                sample.site_name, sample.site_location
            ));
            body.push_str(&format!(
                "Machines at this site are due for maintenance within {} day(s).\n",
                sample.notification_threshold
            ));
            body.push_str("Example: Sample Machine (#1), model SM-100, last serviced 45 days ago.\n");
        }
        body
    }
}
