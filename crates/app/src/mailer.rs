//! Mailer that records outgoing email in the log instead of delivering it.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use maintrack_domain::error::MaintrackError;

use crate::ports::{Mailer, OutgoingEmail};

/// Logs every message at `INFO` and keeps a copy in an in-memory outbox.
///
/// Used until an SMTP adapter exists, and by tests to inspect what was sent.
#[derive(Debug, Default)]
pub struct LogMailer {
    outbox: Mutex<Vec<OutgoingEmail>>,
}

impl LogMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Mailer for LogMailer {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = Result<(), MaintrackError>> + Send {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            body_len = email.body.len(),
            "email sent"
        );
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email);
        async { Ok(()) }
    }
}
