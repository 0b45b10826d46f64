//! Session-change fan-out shared by backend implementations.

use std::sync::{Arc, Mutex};

use bridge_types::AuthenticatedUser;
use tokio::sync::broadcast;

/// Receiver of session reports (`None` = signed out).
pub type AuthStateStream = broadcast::Receiver<Option<AuthenticatedUser>>;

// Subscribers that fall further behind than this see `Lagged` and must
// resync from `current()`.
const AUTH_STATE_BUFFER: usize = 16;

/// Holds the current session user and broadcasts every change.
///
/// Cloning shares the same state and channel.
#[derive(Debug, Clone)]
pub struct AuthStatePublisher {
    current: Arc<Mutex<Option<AuthenticatedUser>>>,
    tx: broadcast::Sender<Option<AuthenticatedUser>>,
}

impl AuthStatePublisher {
    /// Create a publisher in the signed-out state.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(AUTH_STATE_BUFFER);
        Self {
            current: Arc::new(Mutex::new(None)),
            tx,
        }
    }

    /// Current session user.
    pub fn current(&self) -> Option<AuthenticatedUser> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Subscribe to future reports.
    pub fn subscribe(&self) -> AuthStateStream {
        self.tx.subscribe()
    }

    /// Record a new session state and report it to subscribers.
    ///
    /// Reporting is best-effort; with no subscribers the state is still kept.
    pub fn publish(&self, user: Option<AuthenticatedUser>) {
        {
            let mut current = self
                .current
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *current = user.clone();
        }
        tracing::debug!(signed_in = user.is_some(), "Auth state changed");
        let _ = self.tx.send(user);
    }
}

impl Default for AuthStatePublisher {
    fn default() -> Self {
        Self::new()
    }
}
