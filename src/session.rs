//! Session context for the logged-in user.
//!
//! DESIGN
//! ======
//! No process-wide mutable auth object. The session is an immutable value
//! injected into each controller at construction, and [`SessionStore`] is
//! the single mutation entry point: `update` broadcasts the new value over
//! a watch channel and subscribers re-read on change. Nothing else can
//! mutate the session.

use tokio::sync::watch;

use crate::model::AccountRole;

/// Immutable snapshot of the logged-in user, cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
    pub name: String,
    pub role: AccountRole,
    /// Bearer token attached to API calls, when authenticated.
    pub token: Option<String>,
}

impl SessionContext {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, role: AccountRole) -> Self {
        Self { user_id: user_id.into(), name: name.into(), role, token: None }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Broadcast holder for the current session.
///
/// Controllers take a [`SessionContext`] value; long-lived hosts that need
/// to react to login/logout subscribe here instead of reading a global.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: watch::Sender<SessionContext>,
}

impl SessionStore {
    #[must_use]
    pub fn new(initial: SessionContext) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the current session and notify subscribers.
    pub fn update(&self, next: SessionContext) {
        // send_replace never fails; the store holds its own receiver slot.
        self.tx.send_replace(next);
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> SessionContext {
        self.tx.borrow().clone()
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionContext> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
