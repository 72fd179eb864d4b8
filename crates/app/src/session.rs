//! In-process session store backed by a mutex-guarded map.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use maintrack_domain::flash::Flash;
use maintrack_domain::id::{SessionId, UserId};

use crate::ports::SessionStore;

#[derive(Debug, Default)]
struct SessionData {
    flashes: Vec<Flash>,
    user: Option<UserId>,
}

/// Keeps session state in memory for the lifetime of the process.
///
/// Sessions are created lazily on first write and forgotten on restart.
#[derive(Debug, Default)]
pub struct InProcessSessionStore {
    sessions: Mutex<HashMap<SessionId, SessionData>>,
}

impl InProcessSessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently holding state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionData>> {
        // The map holds plain data, so a poisoned lock is still consistent.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for InProcessSessionStore {
    fn push_flash(&self, session: SessionId, flash: Flash) {
        tracing::debug!(%session, level = %flash.level, "queueing flash message");
        self.lock().entry(session).or_default().flashes.push(flash);
    }

    fn take_flashes(&self, session: SessionId) -> Vec<Flash> {
        let mut sessions = self.lock();
        let Some(data) = sessions.get_mut(&session) else {
            return Vec::new();
        };
        let flashes = std::mem::take(&mut data.flashes);
        if data.user.is_none() {
            sessions.remove(&session);
        }
        flashes
    }

    fn login(&self, session: SessionId, user: UserId) {
        self.lock().entry(session).or_default().user = Some(user);
    }

    fn logout(&self, session: SessionId) {
        let mut sessions = self.lock();
        if let Some(data) = sessions.get_mut(&session) {
            data.user = None;
            if data.flashes.is_empty() {
                sessions.remove(&session);
            }
        }
    }

    fn current_user(&self, session: SessionId) -> Option<UserId> {
        self.lock().get(&session).and_then(|data| data.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_flashes_in_push_order() {
        let store = InProcessSessionStore::new();
        let session = SessionId::new();
        store.push_flash(session, Flash::success("saved"));
        store.push_flash(session, Flash::error("but also"));

        let flashes = store.take_flashes(session);
        let messages: Vec<&str> = flashes.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["saved", "but also"]);
    }

    #[test]
    fn should_deliver_each_flash_at_most_once() {
        let store = InProcessSessionStore::new();
        let session = SessionId::new();
        store.push_flash(session, Flash::success("saved"));

        assert_eq!(store.take_flashes(session).len(), 1);
        assert!(store.take_flashes(session).is_empty());
    }

    #[test]
    fn should_isolate_sessions() {
        let store = InProcessSessionStore::new();
        let mine = SessionId::new();
        let theirs = SessionId::new();
        store.push_flash(mine, Flash::info("hello"));

        assert!(store.take_flashes(theirs).is_empty());
        assert_eq!(store.take_flashes(mine).len(), 1);
    }

    #[test]
    fn should_track_logged_in_user() {
        let store = InProcessSessionStore::new();
        let session = SessionId::new();
        let user = UserId::new();
        assert_eq!(store.current_user(session), None);

        store.login(session, user);
        assert_eq!(store.current_user(session), Some(user));

        store.logout(session);
        assert_eq!(store.current_user(session), None);
    }

    #[test]
    fn should_keep_pending_flash_across_logout() {
        let store = InProcessSessionStore::new();
        let session = SessionId::new();
        store.login(session, UserId::new());
        store.push_flash(session, Flash::info("You have been logged out."));
        store.logout(session);

        assert_eq!(store.take_flashes(session).len(), 1);
    }

    #[test]
    fn should_forget_anonymous_session_once_flashes_drained() {
        let store = InProcessSessionStore::new();
        for _ in 0..1_000 {
            let session = SessionId::new();
            store.push_flash(session, Flash::error("name is required"));
            assert_eq!(store.take_flashes(session).len(), 1);
        }

        assert!(store.is_empty());
    }

    #[test]
    fn should_keep_logged_in_session_after_flashes_drained() {
        let store = InProcessSessionStore::new();
        let session = SessionId::new();
        let user = UserId::new();
        store.login(session, user);
        store.push_flash(session, Flash::success("Welcome back."));
        store.take_flashes(session);

        assert_eq!(store.len(), 1);
        assert_eq!(store.current_user(session), Some(user));
    }
}
