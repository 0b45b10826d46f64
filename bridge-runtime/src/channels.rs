//! Port channel pair: outbound commands in, inbound events out.

use bridge_types::{InboundMessage, OutboundMessage};
use tokio::sync::{broadcast, mpsc};

use crate::error::BridgeError;

/// Stream of inbound messages handed to UI subscribers.
pub type EventStream = broadcast::Receiver<InboundMessage>;

/// Bounded command queue plus event fan-out.
#[derive(Debug, Clone)]
pub struct BridgeChannels {
    command_tx: mpsc::Sender<OutboundMessage>,
    event_tx: broadcast::Sender<InboundMessage>,
}

impl BridgeChannels {
    /// Create a channel set and return it with the command receiver.
    ///
    /// Zero buffer sizes are raised to 1.
    pub fn new(
        command_buffer: usize,
        event_buffer: usize,
    ) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer.max(1));
        let (event_tx, _) = broadcast::channel(event_buffer.max(1));
        (
            Self {
                command_tx,
                event_tx,
            },
            command_rx,
        )
    }

    /// Clone the event sender (for the context that emits).
    pub fn event_sender(&self) -> broadcast::Sender<InboundMessage> {
        self.event_tx.clone()
    }

    /// Subscribe to inbound messages emitted from now on.
    pub fn subscribe(&self) -> EventStream {
        self.event_tx.subscribe()
    }

    /// Queue one outbound message for the runtime.
    pub async fn send(&self, message: OutboundMessage) -> Result<(), BridgeError> {
        self.command_tx
            .send(message)
            .await
            .map_err(|_| BridgeError::ChannelClosed)
    }
}
