//! Mock backend for testing.
//!
//! Holds collections in memory, allows queueing failures and captures every
//! call for verification.

use super::{AuthStatePublisher, AuthStateStream, Backend, BackendError};
use async_trait::async_trait;
use bridge_types::{AuthenticatedUser, Document, FieldValue};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// A call received by [`MockBackend`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `sign_in_with_email_and_password`
    SignIn {
        /// Login used
        email: String,
    },
    /// `sign_out`
    SignOut,
    /// `list_documents`
    List {
        /// Collection scanned
        collection: String,
    },
    /// `delete_document`
    Delete {
        /// Collection
        collection: String,
        /// Document id
        id: String,
    },
    /// `query_equal`
    Query {
        /// Collection
        collection: String,
        /// Filter field
        field: String,
        /// Filter value
        value: FieldValue,
    },
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    uid: String,
}

#[derive(Debug, Default)]
struct MockBackendInner {
    collections: HashMap<String, Vec<Document>>,
    accounts: HashMap<String, Account>,
    calls: Vec<BackendCall>,
    fail_sign_in: VecDeque<String>,
    fail_list: VecDeque<String>,
    fail_query: VecDeque<String>,
    fail_delete: VecDeque<String>,
    fail_delete_of: HashMap<(String, String), String>,
}

/// Mock backend for testing.
///
/// Cloning shares the same collections, accounts and session.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
    auth: AuthStatePublisher,
}

impl MockBackend {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockBackendInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a document to a collection (enumeration order = insertion order).
    pub fn insert_document(&self, collection: &str, doc: Document) {
        let mut inner = self.lock();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    /// Register an account that `sign_in_with_email_and_password` accepts.
    pub fn add_account(&self, email: &str, password: &str, uid: &str) {
        let mut inner = self.lock();
        inner.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                uid: uid.to_string(),
            },
        );
    }

    /// Current contents of a collection.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        let inner = self.lock();
        inner
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// `(collection, id)` of every delete call received so far.
    pub fn delete_calls(&self) -> Vec<(String, String)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Delete { collection, id } => Some((collection.clone(), id.clone())),
                _ => None,
            })
            .collect()
    }

    /// Cause the next sign-in to fail with the given auth code.
    pub fn fail_next_sign_in(&self, code: &str) {
        self.lock().fail_sign_in.push_back(code.to_string());
    }

    /// Cause the next collection read to fail with the given code.
    ///
    /// Calling this N times fails the next N reads.
    pub fn fail_next_list(&self, code: &str) {
        self.lock().fail_list.push_back(code.to_string());
    }

    /// Cause the next query to fail with the given code.
    pub fn fail_next_query(&self, code: &str) {
        self.lock().fail_query.push_back(code.to_string());
    }

    /// Cause the next delete (whichever document) to fail with the given code.
    pub fn fail_next_delete(&self, code: &str) {
        self.lock().fail_delete.push_back(code.to_string());
    }

    /// Cause every delete of one specific document to fail.
    pub fn fail_delete_of(&self, collection: &str, id: &str, code: &str) {
        self.lock()
            .fail_delete_of
            .insert((collection.to_string(), id.to_string()), code.to_string());
    }

    /// Clear all state (documents, accounts, calls, queued failures).
    ///
    /// The session is left untouched.
    pub fn reset(&self) {
        *self.lock() = MockBackendInner::default();
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError> {
        let user = {
            let mut inner = self.lock();
            inner.calls.push(BackendCall::SignIn {
                email: email.to_string(),
            });

            // Check for forced failure
            if let Some(code) = inner.fail_sign_in.pop_front() {
                return Err(BackendError::auth(code, "forced failure"));
            }

            let account = inner
                .accounts
                .get(email)
                .cloned()
                .ok_or_else(|| BackendError::auth("auth/user-not-found", "EMAIL_NOT_FOUND"))?;
            if account.password != password {
                return Err(BackendError::auth(
                    "auth/wrong-password",
                    "INVALID_PASSWORD",
                ));
            }
            AuthenticatedUser::new(account.uid, email)
        };

        self.auth.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.lock().calls.push(BackendCall::SignOut);
        if self.auth.current().is_some() {
            self.auth.publish(None);
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthenticatedUser> {
        self.auth.current()
    }

    fn subscribe_auth_state(&self) -> AuthStateStream {
        self.auth.subscribe()
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::List {
            collection: collection.to_string(),
        });

        if let Some(code) = inner.fail_list.pop_front() {
            return Err(BackendError::firestore(code, "forced failure"));
        }

        Ok(inner
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });

        let key = (collection.to_string(), id.to_string());
        if let Some(code) = inner.fail_delete_of.get(&key).cloned() {
            return Err(BackendError::firestore(code, "forced failure"));
        }
        if let Some(code) = inner.fail_delete.pop_front() {
            return Err(BackendError::firestore(code, "forced failure"));
        }

        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }

    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<Document>, BackendError> {
        let mut inner = self.lock();
        inner.calls.push(BackendCall::Query {
            collection: collection.to_string(),
            field: field.to_string(),
            value: value.clone(),
        });

        if let Some(code) = inner.fail_query.pop_front() {
            return Err(BackendError::firestore(code, "forced failure"));
        }

        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.field(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
