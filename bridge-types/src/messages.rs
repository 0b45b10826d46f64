//! Port messages exchanged between the UI and the bridge.
//!
//! Every message is a JSON object `{"channel": <name>, "payload": <value>}`.
//! Messages without a payload omit the `payload` key.

use serde::{Deserialize, Serialize};

use crate::{AuthenticatedUser, Credentials, Meeting, TypesError};

/// Channel names as they appear on the wire.
pub mod channels {
    /// UI asks to delete one meeting.
    pub const DELETE_MEETING: &str = "delete-meeting";
    /// UI asks for the full meeting list.
    pub const FETCH_MEETINGS: &str = "fetch-meetings";
    /// UI asks to end the session.
    pub const SIGN_OUT: &str = "sign-out";
    /// UI submits login credentials.
    pub const VERIFY_CREDENTIALS: &str = "verify-credentials";

    /// Backend reports an active session.
    pub const AUTHENTICATION_SUCCEEDED: &str = "authentication-succeeded";
    /// Backend reports no active session.
    pub const USER_SIGNED_OUT: &str = "user-signed-out";
    /// Primary meeting delete succeeded.
    pub const MEETING_DELETED: &str = "meeting-deleted";
    /// Meeting list fetched.
    pub const MEETINGS_FETCHED: &str = "meetings-fetched";
    /// Sign-in failed.
    pub const AUTHENTICATION_FAILED: &str = "authentication-failed";
    /// Primary meeting delete failed.
    pub const MEETING_DELETE_FAILED: &str = "meeting-delete-failed";
    /// Meeting list fetch failed.
    pub const MEETINGS_FETCH_FAILED: &str = "meetings-fetch-failed";
}

/// Messages sent by the UI to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum OutboundMessage {
    /// Delete a meeting and its guests
    DeleteMeeting(String),
    /// Fetch every meeting
    FetchMeetings,
    /// Terminate the backend session
    SignOut,
    /// Create a backend session from credentials
    VerifyCredentials(Credentials),
}

impl OutboundMessage {
    /// Wire channel name of this message.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::DeleteMeeting(_) => channels::DELETE_MEETING,
            Self::FetchMeetings => channels::FETCH_MEETINGS,
            Self::SignOut => channels::SIGN_OUT,
            Self::VerifyCredentials(_) => channels::VERIFY_CREDENTIALS,
        }
    }

    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> Result<String, TypesError> {
        serde_json::to_string(self).map_err(TypesError::Encode)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, TypesError> {
        serde_json::from_str(json).map_err(TypesError::Decode)
    }
}

/// Payload of `meeting-delete-failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFailure {
    /// The meeting that could not be deleted
    pub meeting_id: String,
    /// Backend-defined error code
    pub code: String,
}

/// Messages sent by the bridge to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum InboundMessage {
    /// A session became active
    AuthenticationSucceeded(AuthenticatedUser),
    /// The session ended; payload is always `true`
    UserSignedOut(bool),
    /// The meeting document was deleted
    MeetingDeleted(String),
    /// Every meeting, in backend enumeration order
    MeetingsFetched(Vec<Meeting>),
    /// Sign-in failed with a backend error code
    AuthenticationFailed(String),
    /// The meeting document could not be deleted
    MeetingDeleteFailed(DeleteFailure),
    /// The meeting list could not be fetched
    MeetingsFetchFailed(String),
}

impl InboundMessage {
    /// The `user-signed-out` message with its `true` sentinel.
    pub fn signed_out() -> Self {
        Self::UserSignedOut(true)
    }

    /// Wire channel name of this message.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::AuthenticationSucceeded(_) => channels::AUTHENTICATION_SUCCEEDED,
            Self::UserSignedOut(_) => channels::USER_SIGNED_OUT,
            Self::MeetingDeleted(_) => channels::MEETING_DELETED,
            Self::MeetingsFetched(_) => channels::MEETINGS_FETCHED,
            Self::AuthenticationFailed(_) => channels::AUTHENTICATION_FAILED,
            Self::MeetingDeleteFailed(_) => channels::MEETING_DELETE_FAILED,
            Self::MeetingsFetchFailed(_) => channels::MEETINGS_FETCH_FAILED,
        }
    }

    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> Result<String, TypesError> {
        serde_json::to_string(self).map_err(TypesError::Encode)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, TypesError> {
        serde_json::from_str(json).map_err(TypesError::Decode)
    }
}
