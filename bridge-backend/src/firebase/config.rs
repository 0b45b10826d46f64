//! Firebase project configuration.

use serde::Deserialize;

use crate::BackendError;

/// Connection settings for one Firebase project.
///
/// Endpoints default to the production Google APIs; point them at the
/// local emulator suite (or a test fake) to run offline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FirebaseConfig {
    /// Web API key of the project.
    pub api_key: String,
    /// Project identifier.
    pub project_id: String,
    /// Firestore database id (default: `(default)`).
    #[serde(default = "default_database_id")]
    pub database_id: String,
    /// Identity Toolkit base URL.
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    /// Secure Token base URL (ID token refresh).
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    /// Firestore base URL.
    #[serde(default = "default_firestore_endpoint")]
    pub firestore_endpoint: String,
    /// Documents requested per page on collection reads (default: 300).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

// Default value functions
fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_auth_endpoint() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_token_endpoint() -> String {
    "https://securetoken.googleapis.com".to_string()
}

fn default_firestore_endpoint() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_page_size() -> u32 {
    300
}

impl FirebaseConfig {
    /// Create a production configuration for a project.
    pub fn new(api_key: &str, project_id: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            project_id: project_id.to_string(),
            database_id: default_database_id(),
            auth_endpoint: default_auth_endpoint(),
            token_endpoint: default_token_endpoint(),
            firestore_endpoint: default_firestore_endpoint(),
            page_size: default_page_size(),
        }
    }

    /// Route every request to one base URL (test fakes, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        self.auth_endpoint = base.clone();
        self.token_endpoint = base.clone();
        self.firestore_endpoint = base;
        self
    }

    /// Route requests to a local Firebase emulator suite.
    ///
    /// `auth_host` and `firestore_host` are `host:port` pairs.
    pub fn with_emulators(mut self, auth_host: &str, firestore_host: &str) -> Self {
        self.auth_endpoint = format!("http://{}/identitytoolkit.googleapis.com", auth_host);
        self.token_endpoint = format!("http://{}/securetoken.googleapis.com", auth_host);
        self.firestore_endpoint = format!("http://{}", firestore_host);
        self
    }

    /// Set the collection read page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `api_key` or `project_id` is empty
    /// - `page_size` is zero
    /// - an endpoint is not an http(s) URL
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.api_key.trim().is_empty() {
            return Err(BackendError::Config("api_key must not be empty".to_string()));
        }

        if self.project_id.trim().is_empty() {
            return Err(BackendError::Config(
                "project_id must not be empty".to_string(),
            ));
        }

        if self.page_size == 0 {
            return Err(BackendError::Config(
                "page_size must be at least 1".to_string(),
            ));
        }

        for endpoint in [
            &self.auth_endpoint,
            &self.token_endpoint,
            &self.firestore_endpoint,
        ] {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(BackendError::Config(format!(
                    "endpoint must be an http(s) URL, got {}",
                    endpoint
                )));
            }
        }

        Ok(())
    }
}
