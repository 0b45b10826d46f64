//! Auth-state transition tracking.
//!
//! The backend reports the current session (present or absent) whenever it
//! changes, and once more when a listener is installed. The UI must see
//! exactly one port message per transition, so repeated reports of the
//! same state are swallowed here.

use bridge_types::{AuthenticatedUser, InboundMessage};

/// Session state as last reported to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing reported yet.
    #[default]
    Unknown,
    /// No active session.
    SignedOut,
    /// Active session for this user.
    SignedIn(AuthenticatedUser),
}

/// Collapses raw session reports into transitions.
///
/// Pure: feed it reports, it hands back the message to emit (if any).
#[derive(Debug, Clone, Default)]
pub struct AuthTransitionTracker {
    state: AuthState,
}

impl AuthTransitionTracker {
    /// Create a tracker with nothing reported yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last state forwarded to the UI.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Record a session report.
    ///
    /// Returns the port message to emit when the report is a transition.
    /// A signed-in report for a different `uid` than the current one is a
    /// transition; the same `uid` again is not.
    pub fn observe(&mut self, report: Option<AuthenticatedUser>) -> Option<InboundMessage> {
        match report {
            None => {
                if self.state == AuthState::SignedOut {
                    return None;
                }
                self.state = AuthState::SignedOut;
                Some(InboundMessage::signed_out())
            }
            Some(user) => {
                if let AuthState::SignedIn(current) = &self.state {
                    if current.uid == user.uid {
                        return None;
                    }
                }
                self.state = AuthState::SignedIn(user.clone());
                Some(InboundMessage::AuthenticationSucceeded(user))
            }
        }
    }
}
