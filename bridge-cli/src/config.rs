//! Configuration loading for meetbridge.
//!
//! Configuration is loaded from a TOML file (default:
//! `<config dir>/meetbridge/meetbridge.toml`).

use std::path::{Path, PathBuf};

use bridge_backend::{FirebaseConfig, MockBackend};
use bridge_runtime::{BridgeConfig, CollectionsConfig};
use bridge_types::{Document, FieldValue};
use serde::Deserialize;
use serde_json::Map;

/// Root configuration for meetbridge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Firebase project (required unless running with `--mock`).
    pub firebase: Option<FirebaseConfig>,
    /// Collection names.
    #[serde(default)]
    pub collections: CollectionsConfig,
    /// Runtime tuning.
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Seed data for the in-memory backend.
    #[serde(default)]
    pub mock: MockConfig,
}

/// Seed data for `--mock` runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MockConfig {
    /// Accounts accepted by sign-in.
    #[serde(default)]
    pub accounts: Vec<MockAccount>,
    /// Documents of the meeting collection.
    #[serde(default)]
    pub meetings: Vec<SeedDocument>,
    /// Documents of the guest collection.
    #[serde(default)]
    pub guests: Vec<SeedDocument>,
}

/// One mock account.
#[derive(Debug, Clone, Deserialize)]
pub struct MockAccount {
    /// Sign-in email.
    pub email: String,
    /// Sign-in password.
    pub password: String,
    /// User id reported on sign-in (default: `uid-<email local part>`).
    pub uid: Option<String>,
}

/// One seeded document.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedDocument {
    /// Document id.
    pub id: String,
    /// Document fields.
    #[serde(default)]
    pub fields: Map<String, FieldValue>,
}

impl MockConfig {
    /// Load the seed data into a mock backend.
    pub fn seed(&self, backend: &MockBackend, collections: &CollectionsConfig) {
        for account in &self.accounts {
            let uid = account.uid.clone().unwrap_or_else(|| {
                let local = account.email.split('@').next().unwrap_or_default();
                format!("uid-{}", local)
            });
            backend.add_account(&account.email, &account.password, &uid);
        }

        for (collection, seeds) in [
            (&collections.meetings, &self.meetings),
            (&collections.guests, &self.guests),
        ] {
            for seed in seeds {
                backend.insert_document(
                    collection,
                    Document {
                        id: seed.id.clone(),
                        fields: seed.fields.clone(),
                    },
                );
            }
        }

        tracing::debug!(
            accounts = self.accounts.len(),
            meetings = self.meetings.len(),
            guests = self.guests.len(),
            "Mock backend seeded"
        );
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration.
    ///
    /// A `[firebase]` section is required unless `mock` is set.
    pub fn validate(&self, mock: bool) -> Result<(), ConfigError> {
        match &self.firebase {
            Some(firebase) if !mock => firebase
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            None if !mock => {
                return Err(ConfigError::Invalid(
                    "missing [firebase] section (or run with --mock)".to_string(),
                ))
            }
            _ => {}
        }

        self.collections
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.bridge
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// Configuration parsed but is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::Backend;
    use bridge_runtime::DeleteFailurePolicy;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn full_config_parses() {
        let file = write_config(
            r#"
[firebase]
api_key = "AIza-test"
project_id = "meetings-prod"
page_size = 50

[collections]
meetings = "events"

[bridge]
delete_failure = "notify"
fetch_retry_attempts = 4
"#,
        );

        let config = Config::from_file(file.path()).unwrap();
        let firebase = config.firebase.as_ref().unwrap();
        assert_eq!(firebase.project_id, "meetings-prod");
        assert_eq!(firebase.page_size, 50);
        assert_eq!(firebase.database_id, "(default)");
        assert_eq!(config.collections.meetings, "events");
        assert_eq!(config.collections.guests, "guests");
        assert_eq!(config.bridge.delete_failure, DeleteFailurePolicy::Notify);
        assert_eq!(config.bridge.fetch_retry_attempts, 4);
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn empty_file_is_valid_only_for_mock() {
        let file = write_config("");
        let config = Config::from_file(file.path()).unwrap();
        assert!(config.firebase.is_none());
        assert!(config.validate(true).is_ok());

        let err = config.validate(false).unwrap_err();
        assert!(err.to_string().contains("[firebase]"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::from_file(Path::new("/nonexistent/meetbridge.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("/nonexistent/meetbridge.toml"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let file = write_config("[bridge\ncommand_buffer = ");
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_firebase_section_is_rejected() {
        let file = write_config(
            r#"
[firebase]
api_key = ""
project_id = "demo"
"#,
        );
        let config = Config::from_file(file.path()).unwrap();
        let err = config.validate(false).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[tokio::test]
    async fn mock_section_seeds_backend() {
        let file = write_config(
            r#"
[[mock.accounts]]
email = "ada@example.com"
password = "correct-horse"

[[mock.meetings]]
id = "m1"
fields = { name = "Standup", startTime = "09:00" }

[[mock.guests]]
id = "g1"
fields = { meetingId = "m1" }
"#,
        );
        let config = Config::from_file(file.path()).unwrap();
        let backend = MockBackend::new();
        config.mock.seed(&backend, &config.collections);

        let meetings = backend.list_documents("meetings").await.unwrap();
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].field("name"), Some(&json!("Standup")));
        assert_eq!(backend.documents("guests").len(), 1);

        let user = backend
            .sign_in_with_email_and_password("ada@example.com", "correct-horse")
            .await
            .unwrap();
        assert_eq!(user.uid, "uid-ada");
    }
}
