//! Backend abstraction for meetbridge.
//!
//! This module provides the seam between the bridge and the hosted
//! authentication + document store (Firebase, mock for testing).
//!
//! # Design
//!
//! The backend trait is async and stateless from the caller's view:
//! - `sign_in_with_email_and_password()` / `sign_out()` drive the session
//! - `subscribe_auth_state()` reports every session change
//! - `list_documents()`, `query_equal()`, `delete_document()` touch collections
//!
//! Every failure carries an opaque, backend-defined [`BackendError::code`].

mod auth_state;
mod mock;

pub use auth_state::{AuthStatePublisher, AuthStateStream};
pub use mock::{BackendCall, MockBackend};

use async_trait::async_trait;
use bridge_types::{AuthenticatedUser, Document, FieldValue};
use thiserror::Error;

/// Backend errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Authentication service rejected the request.
    #[error("authentication failed: {code} ({message})")]
    Auth {
        /// SDK-style error code, e.g. `auth/wrong-password`.
        code: String,
        /// Raw service message.
        message: String,
    },

    /// Document store rejected the request.
    #[error("document store error: {code} ({message})")]
    Firestore {
        /// Status code, e.g. `permission-denied`.
        code: String,
        /// Raw service message.
        message: String,
    },

    /// HTTP transport failed before a response was received.
    #[error("http error: {0}")]
    Http(String),

    /// An operation needed a session and none is active.
    #[error("not signed in")]
    NotSignedIn,

    /// The service answered with something we could not parse.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Backend configuration is unusable.
    #[error("invalid config: {0}")]
    Config(String),
}

impl BackendError {
    /// Backend-defined error code forwarded to the UI.
    pub fn code(&self) -> &str {
        match self {
            BackendError::Auth { code, .. } | BackendError::Firestore { code, .. } => code,
            BackendError::Http(_) => "unavailable",
            BackendError::NotSignedIn => "unauthenticated",
            BackendError::InvalidResponse(_) => "internal",
            BackendError::Config(_) => "invalid-argument",
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Http(_) => true,
            BackendError::Auth { code, .. } => code == "auth/network-request-failed",
            BackendError::Firestore { code, .. } => matches!(
                code.as_str(),
                "unavailable" | "deadline-exceeded" | "resource-exhausted" | "aborted" | "internal"
            ),
            BackendError::NotSignedIn
            | BackendError::InvalidResponse(_)
            | BackendError::Config(_) => false,
        }
    }

    /// Convenience constructor for auth failures.
    pub fn auth(code: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Auth {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for document store failures.
    pub fn firestore(code: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Firestore {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::InvalidResponse(e.to_string())
        } else {
            BackendError::Http(e.to_string())
        }
    }
}

/// Backend trait for the hosted auth + document service.
///
/// Implementations own the session; the bridge never sees tokens.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create a session from email and password.
    ///
    /// On success the new user is also published to auth-state subscribers.
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError>;

    /// Terminate the current session (no-op when signed out).
    ///
    /// The absent state is published to auth-state subscribers.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The user of the current session, if any.
    fn current_user(&self) -> Option<AuthenticatedUser>;

    /// Subscribe to session changes.
    fn subscribe_auth_state(&self) -> AuthStateStream;

    /// Read every document in a collection, in backend enumeration order.
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, BackendError>;

    /// Delete one document. Deleting a missing document succeeds.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError>;

    /// Documents whose `field` equals `value`.
    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<Document>, BackendError>;
}
