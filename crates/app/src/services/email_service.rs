//! Email service: admin test emails.

use maintrack_domain::error::MaintrackError;
use maintrack_domain::notification::TestEmail;

use crate::ports::{Mailer, OutgoingEmail};

/// Application service that renders and sends emails through a [`Mailer`].
pub struct EmailService<M> {
    mailer: M,
    from: String,
}

impl<M: Mailer> EmailService<M> {
    /// Create a new service sending from the given address.
    pub fn new(mailer: M, from: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
        }
    }

    /// Send a test email.
    ///
    /// # Errors
    ///
    /// Returns an error propagated from the mailer.
    #[tracing::instrument(skip(self, email), fields(to = %email.to))]
    pub async fn send_test_email(&self, email: &TestEmail) -> Result<(), MaintrackError> {
        self.mailer
            .send(OutgoingEmail {
                from: self.from.clone(),
                to: email.to.to_string(),
                subject: email.subject.clone(),
                body: email.body(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mailer::LogMailer;
    use maintrack_domain::notification::SampleReminder;

    #[tokio::test]
    async fn should_send_rendered_test_email() {
        let mailer = Arc::new(LogMailer::new());
        let svc = EmailService::new(Arc::clone(&mailer), "tracker@example.com");
        let sample = SampleReminder::new("North Plant", "Dock 4", 7).unwrap();
        let email = TestEmail::new("ops@example.com", "Check", "Hello", Some(sample)).unwrap();

        svc.send_test_email(&email).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "tracker@example.com");
        assert_eq!(sent[0].subject, "Check");
        assert!(sent[0].body.contains("North Plant"));
    }
}
