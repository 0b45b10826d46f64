//! Runtime configuration sections (`[collections]`, `[bridge]`).

use std::time::Duration;

use bridge_core::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// What to do when the primary meeting delete fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteFailurePolicy {
    /// Log only; the UI hears nothing.
    #[default]
    Log,
    /// Log and emit `meeting-delete-failed`.
    Notify,
}

/// Backend collection names used by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionsConfig {
    /// Meeting collection (default: `meetings`).
    #[serde(default = "default_meetings")]
    pub meetings: String,

    /// Guest collection cleaned up after a meeting delete (default: `guests`).
    #[serde(default = "default_guests")]
    pub guests: String,

    /// Guest field holding the owning meeting id (default: `meetingId`).
    #[serde(default = "default_dependent_field")]
    pub dependent_field: String,
}

fn default_meetings() -> String {
    "meetings".to_string()
}

fn default_guests() -> String {
    "guests".to_string()
}

fn default_dependent_field() -> String {
    "meetingId".to_string()
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            meetings: default_meetings(),
            guests: default_guests(),
            dependent_field: default_dependent_field(),
        }
    }
}

/// Runtime tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// Outbound command queue capacity (default: 128).
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Inbound event fan-out capacity per subscriber (default: 512).
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Primary delete failure handling (default: `log`).
    #[serde(default)]
    pub delete_failure: DeleteFailurePolicy,

    /// Extra attempts after a transient fetch failure (default: 2).
    #[serde(default = "default_fetch_retry_attempts")]
    pub fetch_retry_attempts: u32,

    /// First fetch retry delay in milliseconds (default: 250).
    #[serde(default = "default_fetch_retry_base_delay_ms")]
    pub fetch_retry_base_delay_ms: u64,

    /// Fetch retry delay cap in milliseconds (default: 4000).
    #[serde(default = "default_fetch_retry_max_delay_ms")]
    pub fetch_retry_max_delay_ms: u64,
}

fn default_command_buffer() -> usize {
    128
}

fn default_event_buffer() -> usize {
    512
}

fn default_fetch_retry_attempts() -> u32 {
    2
}

fn default_fetch_retry_base_delay_ms() -> u64 {
    250
}

fn default_fetch_retry_max_delay_ms() -> u64 {
    4_000
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command_buffer: default_command_buffer(),
            event_buffer: default_event_buffer(),
            delete_failure: DeleteFailurePolicy::default(),
            fetch_retry_attempts: default_fetch_retry_attempts(),
            fetch_retry_base_delay_ms: default_fetch_retry_base_delay_ms(),
            fetch_retry_max_delay_ms: default_fetch_retry_max_delay_ms(),
        }
    }
}

impl BridgeConfig {
    /// Backoff used between fetch attempts.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.fetch_retry_base_delay_ms,
            self.fetch_retry_max_delay_ms,
        )
    }

    /// Longest total time a fetch may spend sleeping between retries.
    pub fn max_fetch_backoff(&self) -> Duration {
        let policy = self.retry_policy();
        (0..self.fetch_retry_attempts)
            .map(|attempt| policy.delay_for_attempt(attempt))
            .sum()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.command_buffer == 0 {
            return Err(BridgeError::InvalidConfig(
                "command_buffer must be at least 1".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(BridgeError::InvalidConfig(
                "event_buffer must be at least 1".to_string(),
            ));
        }

        if self.fetch_retry_base_delay_ms > self.fetch_retry_max_delay_ms {
            return Err(BridgeError::InvalidConfig(format!(
                "fetch_retry_base_delay_ms ({}) exceeds fetch_retry_max_delay_ms ({})",
                self.fetch_retry_base_delay_ms, self.fetch_retry_max_delay_ms
            )));
        }

        Ok(())
    }
}

impl CollectionsConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), BridgeError> {
        for (key, value) in [
            ("meetings", &self.meetings),
            ("guests", &self.guests),
            ("dependent_field", &self.dependent_field),
        ] {
            if value.trim().is_empty() {
                return Err(BridgeError::InvalidConfig(format!(
                    "collections.{} must not be empty",
                    key
                )));
            }
        }
        Ok(())
    }
}
