//! Mailer port: outgoing email delivery.

use std::future::Future;

use maintrack_domain::error::MaintrackError;

/// A fully rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers [`OutgoingEmail`]s.
pub trait Mailer {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = Result<(), MaintrackError>> + Send;
}

impl<T: Mailer + Send + Sync> Mailer for std::sync::Arc<T> {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = Result<(), MaintrackError>> + Send {
        (**self).send(email)
    }
}
