//! Bridge operations: one per outbound port message.
//!
//! Each operation performs its backend calls, emits the inbound messages
//! it owns, and also returns its outcome so callers see both branches.

use bridge_backend::BackendError;
use bridge_core::project_meetings;
use bridge_types::{
    AuthenticatedUser, Credentials, DeleteFailure, FieldValue, InboundMessage, Meeting,
    OutboundMessage,
};
use tokio::task::JoinSet;

use crate::config::DeleteFailurePolicy;
use crate::context::BridgeContext;
use crate::error::BridgeError;

/// Outcome of a successful meeting delete, including guest cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Guests found by the cleanup query.
    pub guests_matched: usize,
    /// Guests deleted.
    pub guests_deleted: usize,
    /// Guests whose delete failed.
    pub guest_failures: Vec<GuestFailure>,
    /// Code of the cleanup query failure, if the query itself failed.
    pub query_error: Option<String>,
}

/// A guest record left behind by cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestFailure {
    /// Guest document id.
    pub id: String,
    /// Backend error code.
    pub code: String,
}

/// Operations over a [`BridgeContext`].
#[derive(Debug, Clone)]
pub struct Bridge {
    ctx: BridgeContext,
}

impl Bridge {
    /// Create a bridge over a context.
    pub fn new(ctx: BridgeContext) -> Self {
        Self { ctx }
    }

    /// The context this bridge operates on.
    pub fn context(&self) -> &BridgeContext {
        &self.ctx
    }

    /// Route one outbound message to its operation.
    ///
    /// Failures have already been logged and reported by the operation.
    pub async fn dispatch(&self, message: OutboundMessage) {
        let channel = message.channel();
        tracing::debug!(channel, "Handling outbound message");

        let result = match message {
            OutboundMessage::DeleteMeeting(meeting_id) => self
                .request_delete_meeting(&meeting_id)
                .await
                .map(|_| ()),
            OutboundMessage::FetchMeetings => self.request_fetch_meetings().await.map(|_| ()),
            OutboundMessage::SignOut => self.request_sign_out().await,
            OutboundMessage::VerifyCredentials(credentials) => self
                .request_verify_credentials(&credentials)
                .await
                .map(|_| ()),
        };

        if let Err(err) = result {
            tracing::debug!(channel, code = err.code(), "Outbound message failed");
        }
    }

    /// Delete a meeting, then every guest that references it.
    ///
    /// `meeting-deleted` is emitted as soon as the meeting document is
    /// gone; guest cleanup failures are logged and reported in the
    /// [`DeleteReport`] but never undo the meeting delete.
    pub async fn request_delete_meeting(
        &self,
        meeting_id: &str,
    ) -> Result<DeleteReport, BridgeError> {
        let collections = self.ctx.collections();

        if let Err(err) = self
            .ctx
            .backend()
            .delete_document(&collections.meetings, meeting_id)
            .await
        {
            tracing::error!(meeting_id, code = err.code(), error = %err, "Meeting delete failed");
            if self.ctx.config().delete_failure == DeleteFailurePolicy::Notify {
                self.ctx
                    .emit(InboundMessage::MeetingDeleteFailed(DeleteFailure {
                        meeting_id: meeting_id.to_string(),
                        code: err.code().to_string(),
                    }));
            }
            return Err(err.into());
        }

        tracing::info!(meeting_id, "Meeting deleted");
        self.ctx
            .emit(InboundMessage::MeetingDeleted(meeting_id.to_string()));

        Ok(self.delete_guests(meeting_id).await)
    }

    async fn delete_guests(&self, meeting_id: &str) -> DeleteReport {
        let collections = self.ctx.collections();
        let key = FieldValue::String(meeting_id.to_string());

        let guests = match self
            .ctx
            .backend()
            .query_equal(&collections.guests, &collections.dependent_field, &key)
            .await
        {
            Ok(guests) => guests,
            Err(err) => {
                tracing::warn!(meeting_id, code = err.code(), error = %err, "Guest lookup failed");
                return DeleteReport {
                    query_error: Some(err.code().to_string()),
                    ..DeleteReport::default()
                };
            }
        };

        let mut report = DeleteReport {
            guests_matched: guests.len(),
            ..DeleteReport::default()
        };

        let mut deletes = JoinSet::new();
        for guest in guests {
            let backend = self.ctx.backend().clone();
            let collection = collections.guests.clone();
            deletes.spawn(async move {
                let result = backend.delete_document(&collection, &guest.id).await;
                (guest.id, result)
            });
        }

        while let Some(joined) = deletes.join_next().await {
            match joined {
                Ok((_, Ok(()))) => report.guests_deleted += 1,
                Ok((id, Err(err))) => {
                    tracing::warn!(meeting_id, guest_id = %id, code = err.code(), "Guest delete failed");
                    report.guest_failures.push(GuestFailure {
                        id,
                        code: err.code().to_string(),
                    });
                }
                Err(err) => {
                    tracing::error!(meeting_id, error = %err, "Guest delete task failed");
                }
            }
        }

        tracing::debug!(
            meeting_id,
            matched = report.guests_matched,
            deleted = report.guests_deleted,
            "Guest cleanup finished"
        );
        report
    }

    /// Read the whole meeting collection and emit it as one
    /// `meetings-fetched` message, in backend order.
    ///
    /// Transient failures are retried; the final failure is reported as
    /// `meetings-fetch-failed`.
    pub async fn request_fetch_meetings(&self) -> Result<Vec<Meeting>, BridgeError> {
        let collection = &self.ctx.collections().meetings;
        let config = self.ctx.config();
        let policy = config.retry_policy();
        let mut attempt: u32 = 0;

        let documents = loop {
            match self.ctx.backend().list_documents(collection).await {
                Ok(documents) => break documents,
                Err(err) if err.is_transient() && attempt < config.fetch_retry_attempts => {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        code = err.code(),
                        delay = ?delay,
                        "Meeting fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(self.fetch_failed(err)),
            }
        };

        let meetings = project_meetings(&documents);
        tracing::info!(count = meetings.len(), "Meetings fetched");
        self.ctx
            .emit(InboundMessage::MeetingsFetched(meetings.clone()));
        Ok(meetings)
    }

    fn fetch_failed(&self, err: BackendError) -> BridgeError {
        tracing::error!(code = err.code(), error = %err, "Meeting fetch failed");
        self.ctx
            .emit(InboundMessage::MeetingsFetchFailed(err.code().to_string()));
        err.into()
    }

    /// End the current session.
    ///
    /// Emits nothing itself; the auth listener reports the signed-out state.
    pub async fn request_sign_out(&self) -> Result<(), BridgeError> {
        self.ctx.backend().sign_out().await.map_err(|err| {
            tracing::warn!(code = err.code(), error = %err, "Sign-out failed");
            BridgeError::from(err)
        })
    }

    /// Start a session from UI-supplied credentials.
    ///
    /// Failure emits `authentication-failed`; success is reported by the
    /// auth listener, not here.
    pub async fn request_verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, BridgeError> {
        match self
            .ctx
            .backend()
            .sign_in_with_email_and_password(&credentials.login, &credentials.password)
            .await
        {
            Ok(user) => {
                tracing::info!(uid = %user.uid, "Credentials verified");
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(code = err.code(), "Credential verification failed");
                self.ctx
                    .emit(InboundMessage::AuthenticationFailed(err.code().to_string()));
                Err(err.into())
            }
        }
    }
}
