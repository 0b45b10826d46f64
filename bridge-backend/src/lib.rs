//! # bridge-backend
//!
//! Backend abstraction for meetbridge.
//!
//! The bridge talks to a hosted authentication + document-collection
//! service through the [`Backend`] trait. Two implementations ship here:
//!
//! - **[`FirebaseBackend`]**: Firebase Authentication (Identity Toolkit) and
//!   Cloud Firestore over their REST APIs
//! - **[`MockBackend`]**: in-memory collections with queueable failures and
//!   call capture, for tests and offline demos
//!
//! ## Example
//!
//! ```ignore
//! use bridge_backend::{Backend, FirebaseBackend, FirebaseConfig};
//!
//! let backend = FirebaseBackend::new(FirebaseConfig::new("api-key", "my-project"))?;
//! backend.sign_in_with_email_and_password("a@b.c", "secret").await?;
//! let docs = backend.list_documents("meetings").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod firebase;

pub use backend::{
    AuthStatePublisher, AuthStateStream, Backend, BackendCall, BackendError, MockBackend,
};
pub use firebase::{FirebaseBackend, FirebaseConfig};
