//! # bridge-runtime
//!
//! Port runtime for meetbridge.
//!
//! The runtime receives outbound UI messages ([`OutboundMessage`]), turns
//! each one into backend calls on its own task, and reports results to
//! every subscriber as inbound messages ([`InboundMessage`]).
//!
//! ## Design
//!
//! - [`BridgeContext`] is the single long-lived state object (backend,
//!   event sender, configuration), passed explicitly
//! - [`Bridge`] exposes one `async fn` per operation, each returning a
//!   `Result` and emitting its own port messages
//! - an auth listener installed once per runtime turns session changes
//!   into `authentication-succeeded` / `user-signed-out`
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bridge_backend::MockBackend;
//! use bridge_runtime::{start, BridgeConfig, CollectionsConfig};
//! use bridge_types::OutboundMessage;
//!
//! let (handle, mut events, task) = start(
//!     Arc::new(MockBackend::new()),
//!     CollectionsConfig::default(),
//!     BridgeConfig::default(),
//! );
//! let initial = events.recv().await?;
//! handle.send(OutboundMessage::FetchMeetings).await?;
//! let fetched = events.recv().await?;
//! ```
//!
//! [`OutboundMessage`]: bridge_types::OutboundMessage
//! [`InboundMessage`]: bridge_types::InboundMessage

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod channels;
pub mod config;
pub mod context;
pub mod error;
pub mod listener;
pub mod runtime;

pub use bridge::{Bridge, DeleteReport, GuestFailure};
pub use channels::{BridgeChannels, EventStream};
pub use config::{BridgeConfig, CollectionsConfig, DeleteFailurePolicy};
pub use context::BridgeContext;
pub use error::BridgeError;
pub use listener::spawn_auth_listener;
pub use runtime::{spawn_runtime, start, BridgeHandle};
