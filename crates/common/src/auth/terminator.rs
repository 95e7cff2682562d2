//! Broadcast-based session terminator
//!
//! Publishes a [`SessionEvent`] on a Tokio broadcast channel so the host
//! (router, UI shell, CLI) can react to a forced sign-out without the API
//! client knowing anything about navigation.

use tokio::sync::broadcast;
use tracing::{debug, info};
use voicedash_domain::constants::SESSION_EVENT_CAPACITY;

use super::traits::SessionTerminator;

/// Session lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were dropped; the user should be sent to `redirect_to`
    Terminated { redirect_to: String },
}

/// [`SessionTerminator`] that fans termination out to subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSessionTerminator {
    sender: broadcast::Sender<SessionEvent>,
}

impl BroadcastSessionTerminator {
    /// Create a terminator with the given channel capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to session events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSessionTerminator {
    fn default() -> Self {
        Self::new(SESSION_EVENT_CAPACITY)
    }
}

impl SessionTerminator for BroadcastSessionTerminator {
    fn terminate(&self, redirect_to: &str) {
        info!(redirect_to = %redirect_to, "Session terminated");

        let event = SessionEvent::Terminated { redirect_to: redirect_to.to_string() };
        if self.sender.send(event).is_err() {
            debug!("No session event subscribers");
        }
    }
}
