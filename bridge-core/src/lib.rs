//! # bridge-core
//!
//! Pure logic for meetbridge (no I/O, instant tests).
//!
//! This crate holds the small amount of decision-making the bridge does
//! on its own, kept free of network access so it can be tested directly:
//! - projecting backend documents into [`Meeting`](bridge_types::Meeting) records
//! - collapsing raw auth-state reports into one port message per transition
//! - computing retry delays
//!
//! The actual I/O is performed by `bridge-runtime` through a
//! `bridge-backend` implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod projection;
pub mod retry;

pub use auth::{AuthState, AuthTransitionTracker};
pub use projection::{project_meeting, project_meetings, MEETING_FIELDS};
pub use retry::RetryPolicy;
