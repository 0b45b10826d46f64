//! The bridge's long-lived state, passed explicitly to every operation.

use std::fmt;
use std::sync::Arc;

use bridge_backend::Backend;
use bridge_types::InboundMessage;
use tokio::sync::broadcast;

use crate::config::{BridgeConfig, CollectionsConfig};

/// Backend handle, event sender and configuration.
///
/// Cheap to clone; clones share the backend and the event channel.
#[derive(Clone)]
pub struct BridgeContext {
    backend: Arc<dyn Backend>,
    events: broadcast::Sender<InboundMessage>,
    collections: Arc<CollectionsConfig>,
    config: Arc<BridgeConfig>,
}

impl fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeContext")
            .field("collections", &self.collections)
            .field("config", &self.config)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl BridgeContext {
    /// Create a context.
    pub fn new(
        backend: Arc<dyn Backend>,
        events: broadcast::Sender<InboundMessage>,
        collections: CollectionsConfig,
        config: BridgeConfig,
    ) -> Self {
        Self {
            backend,
            events,
            collections: Arc::new(collections),
            config: Arc::new(config),
        }
    }

    /// The backend all operations go through.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Collection names.
    pub fn collections(&self) -> &CollectionsConfig {
        &self.collections
    }

    /// Runtime tuning.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Subscribe to inbound messages emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        self.events.subscribe()
    }

    /// Emit an inbound message to every subscriber.
    ///
    /// Emission is best-effort; with no subscriber the message is dropped.
    pub fn emit(&self, message: InboundMessage) {
        tracing::debug!(channel = message.channel(), "Emitting inbound message");
        if self.events.send(message).is_err() {
            tracing::debug!("No subscriber for inbound message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::MockBackend;

    #[tokio::test]
    async fn emit_reaches_subscribers() {
        let (tx, _) = broadcast::channel(4);
        let ctx = BridgeContext::new(
            Arc::new(MockBackend::new()),
            tx,
            CollectionsConfig::default(),
            BridgeConfig::default(),
        );
        let mut events = ctx.subscribe();

        ctx.emit(InboundMessage::signed_out());

        assert_eq!(events.recv().await.unwrap(), InboundMessage::UserSignedOut(true));
    }

    #[test]
    fn emit_without_subscribers_is_harmless() {
        let (tx, _) = broadcast::channel(4);
        let ctx = BridgeContext::new(
            Arc::new(MockBackend::new()),
            tx,
            CollectionsConfig::default(),
            BridgeConfig::default(),
        );
        ctx.emit(InboundMessage::MeetingDeleted("m1".into()));
        assert_eq!(ctx.collections().meetings, "meetings");
    }
}
