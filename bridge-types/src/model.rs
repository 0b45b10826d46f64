//! Records carried across the ports.
//!
//! None of these are persisted. They are built fresh from a backend response
//! (or a UI message) and dropped once forwarded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque field value copied verbatim from a backend document.
///
/// Dates and times are stored however the front-end wrote them; the bridge
/// never interprets them.
pub type FieldValue = serde_json::Value;

/// A meeting mirrored from the `meetings` collection.
///
/// Fields missing from the backend document are absent here and are
/// omitted from the JSON sent to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// Backend-assigned document identifier
    pub id: String,
    /// Display name (opaque, normally a string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldValue>,
    /// Meeting date (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
    /// Start time (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<FieldValue>,
    /// End time (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<FieldValue>,
}

/// The signed-in user as reported by the backend session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Backend user identifier
    pub uid: String,
    /// Account email address
    pub email: String,
}

impl AuthenticatedUser {
    /// Create a new user record.
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Login credentials sent by the UI on `verify-credentials`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login (email address)
    pub login: String,
    /// Plain-text password, used once and discarded
    pub password: String,
}

impl Credentials {
    /// Create a new credentials pair.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meeting_uses_camel_case_fields() {
        let meeting = Meeting {
            id: "m1".into(),
            name: Some("Standup".into()),
            date: Some(json!("2024-01-01")),
            start_time: Some(json!("09:00")),
            end_time: Some(json!("09:15")),
        };

        let value = serde_json::to_value(&meeting).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "m1",
                "name": "Standup",
                "date": "2024-01-01",
                "startTime": "09:00",
                "endTime": "09:15"
            })
        );
    }

    #[test]
    fn meeting_omits_absent_fields() {
        let meeting = Meeting {
            id: "m2".into(),
            name: None,
            date: None,
            start_time: Some(json!("10:00")),
            end_time: None,
        };

        let value = serde_json::to_value(&meeting).unwrap();
        assert_eq!(value, json!({ "id": "m2", "startTime": "10:00" }));
    }

    #[test]
    fn meeting_decodes_with_missing_fields() {
        let meeting: Meeting = serde_json::from_value(json!({ "id": "m3" })).unwrap();
        assert_eq!(meeting.id, "m3");
        assert!(meeting.name.is_none());
        assert!(meeting.end_time.is_none());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("alice@example.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice@example.com"));
        assert!(
            !debug.contains("hunter2"),
            "password must not appear in Debug output, got: {}",
            debug
        );
    }
}
