//! Firebase backend over the Identity Toolkit and Firestore REST APIs.
//!
//! The session (ID token + refresh token) lives inside [`FirebaseBackend`];
//! Firestore requests carry the ID token as a bearer credential and the
//! token is refreshed shortly before it expires.

mod config;
mod firestore;
mod identity;

pub use config::FirebaseConfig;

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bridge_types::{AuthenticatedUser, Document, FieldValue};
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::backend::{AuthStatePublisher, AuthStateStream, Backend, BackendError};
use firestore::{ListDocumentsResponse, RestDocument, RunQueryItem};
use identity::{RefreshResponse, Session, SignInRequest, SignInResponse, NETWORK_REQUEST_FAILED};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google API error envelope shared by both services.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Firebase implementation of [`Backend`].
pub struct FirebaseBackend {
    config: FirebaseConfig,
    http: reqwest::Client,
    /// `.../v1/projects/{p}/databases/{d}/documents`
    documents_url: Url,
    session: Mutex<Option<Session>>,
    auth: AuthStatePublisher,
}

impl fmt::Debug for FirebaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseBackend")
            .field("project_id", &self.config.project_id)
            .field("database_id", &self.config.database_id)
            .field("signed_in", &self.auth.current().is_some())
            .finish_non_exhaustive()
    }
}

impl FirebaseBackend {
    /// Create a backend for the configured project. No request is made.
    pub fn new(config: FirebaseConfig) -> Result<Self, BackendError> {
        config.validate()?;

        let mut documents_url = Url::parse(&config.firestore_endpoint)
            .map_err(|e| BackendError::Config(format!("firestore_endpoint: {}", e)))?;
        if documents_url.cannot_be_a_base() {
            return Err(BackendError::Config(format!(
                "firestore_endpoint cannot be a base URL: {}",
                config.firestore_endpoint
            )));
        }
        documents_url
            .path_segments_mut()
            .map_err(|_| BackendError::Config("firestore_endpoint has no path".to_string()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                config.project_id.as_str(),
                "databases",
                config.database_id.as_str(),
                "documents",
            ]);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Config(format!("http client: {}", e)))?;

        tracing::info!(
            project_id = %config.project_id,
            database_id = %config.database_id,
            "Firebase backend configured"
        );

        Ok(Self {
            config,
            http,
            documents_url,
            session: Mutex::new(None),
            auth: AuthStatePublisher::new(),
        })
    }

    /// The configuration this backend was built from.
    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    fn collection_url(&self, collection: &str) -> Result<Url, BackendError> {
        self.documents_url_with(&[collection])
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, BackendError> {
        self.documents_url_with(&[collection, id])
    }

    fn run_query_url(&self) -> Result<Url, BackendError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Config("documents URL has no path".to_string()))?
            .pop()
            .push("documents:runQuery");
        Ok(url)
    }

    fn documents_url_with(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Config("documents URL has no path".to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// Current ID token, refreshed first if it is about to expire.
    ///
    /// A refresh rejected by the auth service ends the session.
    async fn id_token(&self) -> Result<Option<String>, BackendError> {
        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_ref() else {
            return Ok(None);
        };
        if !session.needs_refresh(Instant::now()) {
            return Ok(Some(session.id_token.clone()));
        }

        let refresh_token = session.refresh_token.clone();
        match self.refresh(&refresh_token).await {
            Ok(response) => {
                let token = response.id_token.clone();
                if let Some(session) = guard.as_mut() {
                    session.apply_refresh(response, Instant::now())?;
                }
                tracing::debug!("ID token refreshed");
                Ok(Some(token))
            }
            Err(err @ BackendError::Auth { .. }) => {
                tracing::warn!(code = err.code(), "Token refresh rejected, ending session");
                *guard = None;
                drop(guard);
                self.auth.publish(None);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, BackendError> {
        let url = format!("{}/v1/token", self.config.token_endpoint.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| BackendError::auth(NETWORK_REQUEST_FAILED, e.to_string()))?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Attach the bearer token when a session exists.
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        Ok(match self.id_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }
}

/// Turn a failed Identity Toolkit response into an auth error.
async fn auth_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
    BackendError::auth(identity::auth_error_code(&message), message)
}

/// Turn a failed Firestore response into a document store error.
async fn firestore_error(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) if !envelope.error.status.is_empty() => BackendError::firestore(
            firestore::status_code(&envelope.error.status),
            envelope.error.message,
        ),
        _ => BackendError::firestore(firestore::http_status_code(status.as_u16()), body),
    }
}

#[async_trait]
impl Backend for FirebaseBackend {
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError> {
        let url = format!(
            "{}/v1/accounts:signInWithPassword",
            self.config.auth_endpoint.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| BackendError::auth(NETWORK_REQUEST_FAILED, e.to_string()))?;

        if !response.status().is_success() {
            let err = auth_error(response).await;
            tracing::debug!(code = err.code(), "Sign-in rejected");
            return Err(err);
        }

        let body: SignInResponse = response.json().await?;
        let session = Session::from_sign_in(body, Instant::now())?;
        let user = session.user.clone();
        *self.session.lock().await = Some(session);

        tracing::info!(uid = %user.uid, "Signed in");
        self.auth.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let previous = self.session.lock().await.take();
        if previous.is_some() {
            tracing::info!("Signed out");
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
        let url = self.collection_url(collection)?;
        let page_size = self.config.page_size.to_string();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .query(&[("pageSize", page_size.as_str())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = self.authorize(request).await?.send().await?;
            if !response.status().is_success() {
                return Err(firestore_error(response).await);
            }

            let page: ListDocumentsResponse = response.json().await?;
            page_token = page.next_page().map(str::to_string);
            documents.extend(page.documents.into_iter().map(RestDocument::into_document));

            if page_token.is_none() {
                break;
            }
        }

        tracing::debug!(collection, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let url = self.document_url(collection, id)?;
        let response = self
            .authorize(self.http.delete(url))
            .await?
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(firestore_error(response).await);
        }

        tracing::debug!(collection, id, "Deleted document");
        Ok(())
    }

    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<Vec<Document>, BackendError> {
        let url = self.run_query_url()?;
        let body = firestore::equality_query(collection, field, value);
        let response = self
            .authorize(self.http.post(url).json(&body))
            .await?
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(firestore_error(response).await);
        }

        let items: Vec<RunQueryItem> = response.json().await?;
        let documents: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(RestDocument::into_document)
            .collect();

        tracing::debug!(collection, field, count = documents.len(), "Query finished");
        Ok(documents)
    }
}
