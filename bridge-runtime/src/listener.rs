//! Auth-state listener.
//!
//! Turns backend session reports into `authentication-succeeded` and
//! `user-signed-out`, one message per transition.

use bridge_core::AuthTransitionTracker;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::context::BridgeContext;

/// Install the auth listener on its own task.
///
/// The current session state is reported once immediately, then every
/// change after that. The task ends when the backend's auth stream closes.
///
/// If the listener falls behind the backend's auth stream, it resyncs from
/// `current_user()` and then replays the reports still buffered. Changes
/// dropped in the gap are lost, so a sign-in followed by a sign-out can
/// collapse into no message. The last state reported always matches the
/// backend's final state.
pub fn spawn_auth_listener(ctx: BridgeContext) -> JoinHandle<()> {
    // Subscribe before reading the current user so no change slips between them.
    let mut reports = ctx.backend().subscribe_auth_state();
    let initial = ctx.backend().current_user();

    tokio::spawn(async move {
        let mut tracker = AuthTransitionTracker::new();
        tracing::debug!(signed_in = initial.is_some(), "Auth listener installed");
        if let Some(message) = tracker.observe(initial) {
            ctx.emit(message);
        }

        loop {
            match reports.recv().await {
                Ok(report) => {
                    if let Some(message) = tracker.observe(report) {
                        ctx.emit(message);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth listener lagged, resyncing");
                    if let Some(message) = tracker.observe(ctx.backend().current_user()) {
                        ctx.emit(message);
                    }
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Auth state stream closed");
                    break;
                }
            }
        }
    })
}
