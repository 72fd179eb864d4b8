//! Session port: per-browser-session state shared across requests.

use maintrack_domain::flash::Flash;
use maintrack_domain::id::{SessionId, UserId};

/// Holds the flash-message queue and logged-in user of each session.
///
/// Implementations are in-memory and synchronous; callers must not hold
/// any lock across an `.await`.
pub trait SessionStore {
    /// Queue a flash message for the next page rendered in `session`.
    fn push_flash(&self, session: SessionId, flash: Flash);

    /// Drain the session's queue. A message is returned at most once.
    fn take_flashes(&self, session: SessionId) -> Vec<Flash>;

    fn login(&self, session: SessionId, user: UserId);

    fn logout(&self, session: SessionId);

    fn current_user(&self, session: SessionId) -> Option<UserId>;
}
