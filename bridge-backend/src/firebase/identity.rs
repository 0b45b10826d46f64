//! Identity Toolkit / Secure Token REST shapes and error mapping.

use std::time::{Duration, Instant};

use bridge_types::AuthenticatedUser;
use serde::{Deserialize, Serialize};

use crate::BackendError;

/// Code reported when the auth service could not be reached.
pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";

/// ID tokens are refreshed this long before they expire.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

/// Secure Token responses use snake_case.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

/// An active session. Tokens never leave this module's owner.
pub(crate) struct Session {
    pub user: AuthenticatedUser,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: Instant,
}

impl Session {
    pub fn from_sign_in(response: SignInResponse, now: Instant) -> Result<Self, BackendError> {
        let lifetime = parse_expires_in(&response.expires_in)?;
        Ok(Self {
            user: AuthenticatedUser::new(response.local_id, response.email),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: now + lifetime,
        })
    }

    pub fn needs_refresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN >= self.expires_at
    }

    pub fn apply_refresh(
        &mut self,
        response: RefreshResponse,
        now: Instant,
    ) -> Result<(), BackendError> {
        let lifetime = parse_expires_in(&response.expires_in)?;
        self.id_token = response.id_token;
        self.refresh_token = response.refresh_token;
        self.expires_at = now + lifetime;
        Ok(())
    }
}

/// Parse the `expiresIn` seconds string.
pub(crate) fn parse_expires_in(raw: &str) -> Result<Duration, BackendError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| BackendError::InvalidResponse(format!("bad expiresIn: {:?}", raw)))
}

/// Map an Identity Toolkit error message to a client-SDK style code.
///
/// Messages look like `INVALID_PASSWORD` or
/// `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account ...`.
pub fn auth_error_code(message: &str) -> &'static str {
    if message.starts_with("API key not valid") {
        return "auth/invalid-api-key";
    }

    let key = message.split(" : ").next().unwrap_or(message).trim();
    match key {
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => "auth/user-not-found",
        "INVALID_PASSWORD" => "auth/wrong-password",
        "INVALID_LOGIN_CREDENTIALS" => "auth/invalid-credential",
        "INVALID_EMAIL" => "auth/invalid-email",
        "MISSING_EMAIL" => "auth/missing-email",
        "MISSING_PASSWORD" => "auth/missing-password",
        "USER_DISABLED" => "auth/user-disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests",
        "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => "auth/operation-not-allowed",
        "TOKEN_EXPIRED" => "auth/user-token-expired",
        "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" => "auth/invalid-user-token",
        _ => "auth/internal-error",
    }
}
