//! # bridge-types
//!
//! Port message protocol and data model for meetbridge.
//!
//! This crate provides the foundational types used across all meetbridge crates:
//! - [`Meeting`], [`AuthenticatedUser`], [`Credentials`] - Records carried over the ports
//! - [`Document`] - A backend document as returned by a collection read or query
//! - [`OutboundMessage`] / [`InboundMessage`] - Port messages (UI → bridge, bridge → UI)
//! - [`TypesError`] - Codec errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod document;
mod error;
mod messages;
mod model;

pub use document::Document;
pub use error::TypesError;
pub use messages::{channels, DeleteFailure, InboundMessage, OutboundMessage};
pub use model::{AuthenticatedUser, Credentials, FieldValue, Meeting};
