//! Runtime loop: drains outbound commands, one task per command.

use std::sync::Arc;

use bridge_backend::Backend;
use bridge_types::OutboundMessage;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use crate::bridge::Bridge;
use crate::channels::{BridgeChannels, EventStream};
use crate::config::{BridgeConfig, CollectionsConfig};
use crate::context::BridgeContext;
use crate::error::BridgeError;
use crate::listener::spawn_auth_listener;

/// UI-side handle to a running bridge.
///
/// The runtime stops once every handle clone is dropped and in-flight
/// commands have finished.
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    channels: BridgeChannels,
}

impl BridgeHandle {
    /// Queue an outbound message.
    pub async fn send(&self, message: OutboundMessage) -> Result<(), BridgeError> {
        self.channels.send(message).await
    }

    /// Subscribe to inbound messages emitted from now on.
    pub fn subscribe(&self) -> EventStream {
        self.channels.subscribe()
    }
}

/// Build the channels and context for `backend` and spawn the runtime.
///
/// The returned stream is subscribed before the runtime is spawned, so it
/// always sees the initial session state the auth listener reports.
pub fn start(
    backend: Arc<dyn Backend>,
    collections: CollectionsConfig,
    config: BridgeConfig,
) -> (BridgeHandle, EventStream, JoinHandle<()>) {
    let (channels, command_rx) = BridgeChannels::new(config.command_buffer, config.event_buffer);
    let ctx = BridgeContext::new(backend, channels.event_sender(), collections, config);
    let events = channels.subscribe();
    let task = spawn_runtime(ctx, command_rx);
    (BridgeHandle { channels }, events, task)
}

/// Spawn the runtime over an existing context and command receiver.
pub fn spawn_runtime(
    ctx: BridgeContext,
    command_rx: mpsc::Receiver<OutboundMessage>,
) -> JoinHandle<()> {
    let runtime = BridgeRuntime {
        bridge: Bridge::new(ctx),
        command_rx,
    };
    tokio::spawn(runtime.run())
}

struct BridgeRuntime {
    bridge: Bridge,
    command_rx: mpsc::Receiver<OutboundMessage>,
}

impl BridgeRuntime {
    async fn run(mut self) {
        let listener = spawn_auth_listener(self.bridge.context().clone());
        let mut in_flight = JoinSet::new();
        tracing::info!("Bridge runtime started");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        let bridge = self.bridge.clone();
                        in_flight.spawn(async move { bridge.dispatch(command).await });
                    }
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = joined {
                        tracing::error!(error = %err, "Command task failed");
                    }
                }
            }
        }

        tracing::debug!(pending = in_flight.len(), "Command channel closed, draining");
        while let Some(joined) = in_flight.join_next().await {
            if let Err(err) = joined {
                tracing::error!(error = %err, "Command task failed");
            }
        }

        listener.abort();
        tracing::info!("Bridge runtime stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bridge_backend::{BackendCall, MockBackend};
    use bridge_types::{AuthenticatedUser, Credentials, Document, InboundMessage};
    use tokio::time::timeout;

    async fn next(events: &mut EventStream) -> InboundMessage {
        timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event timeout")
            .expect("event receive")
    }

    fn seeded() -> MockBackend {
        let backend = MockBackend::new();
        backend.add_account("ada@example.com", "correct-horse", "uid-ada");
        backend.insert_document("meetings", Document::new("m1").with_field("name", "Standup"));
        backend.insert_document("meetings", Document::new("m2").with_field("name", "Retro"));
        backend.insert_document("guests", Document::new("g1").with_field("meetingId", "m1"));
        backend.insert_document("guests", Document::new("g2").with_field("meetingId", "m1"));
        backend
    }

    fn start_on(backend: &MockBackend) -> (BridgeHandle, JoinHandle<()>, EventStream) {
        let (channels, command_rx) = BridgeChannels::new(8, 64);
        let ctx = BridgeContext::new(
            Arc::new(backend.clone()),
            channels.event_sender(),
            CollectionsConfig::default(),
            BridgeConfig::default(),
        );
        let events = channels.subscribe();
        let task = spawn_runtime(ctx, command_rx);
        (BridgeHandle { channels }, task, events)
    }

    #[tokio::test]
    async fn sign_in_flow_through_ports() {
        let backend = seeded();
        let (handle, _task, mut events) = start_on(&backend);
        assert_eq!(next(&mut events).await, InboundMessage::signed_out());

        handle
            .send(OutboundMessage::VerifyCredentials(Credentials::new(
                "ada@example.com",
                "correct-horse",
            )))
            .await
            .unwrap();
        assert_eq!(
            next(&mut events).await,
            InboundMessage::AuthenticationSucceeded(AuthenticatedUser::new(
                "uid-ada",
                "ada@example.com"
            ))
        );

        handle.send(OutboundMessage::SignOut).await.unwrap();
        assert_eq!(next(&mut events).await, InboundMessage::signed_out());
    }

    #[tokio::test]
    async fn rejected_credentials_through_ports() {
        let backend = seeded();
        let (handle, _task, mut events) = start_on(&backend);
        assert_eq!(next(&mut events).await, InboundMessage::signed_out());

        handle
            .send(OutboundMessage::VerifyCredentials(Credentials::new(
                "ada@example.com",
                "nope",
            )))
            .await
            .unwrap();

        assert_eq!(
            next(&mut events).await,
            InboundMessage::AuthenticationFailed("auth/wrong-password".into())
        );
        let quiet = timeout(Duration::from_millis(50), events.recv()).await;
        assert!(quiet.is_err());
    }

    #[tokio::test]
    async fn fetch_and_delete_through_ports() {
        let backend = seeded();
        let (handle, _task, mut events) = start_on(&backend);
        assert_eq!(next(&mut events).await, InboundMessage::signed_out());

        handle.send(OutboundMessage::FetchMeetings).await.unwrap();
        match next(&mut events).await {
            InboundMessage::MeetingsFetched(meetings) => {
                let ids: Vec<&str> = meetings.iter().map(|m| m.id.as_str()).collect();
                assert_eq!(ids, vec!["m1", "m2"]);
                assert_eq!(meetings[1].name, Some(serde_json::json!("Retro")));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        handle
            .send(OutboundMessage::DeleteMeeting("m1".into()))
            .await
            .unwrap();
        assert_eq!(
            next(&mut events).await,
            InboundMessage::MeetingDeleted("m1".into())
        );
    }

    #[tokio::test]
    async fn runtime_drains_in_flight_work_and_stops() {
        let backend = seeded();
        let (handle, task, mut events) = start_on(&backend);
        assert_eq!(next(&mut events).await, InboundMessage::signed_out());

        handle
            .send(OutboundMessage::DeleteMeeting("m1".into()))
            .await
            .unwrap();
        drop(handle);

        timeout(Duration::from_secs(2), task)
            .await
            .expect("runtime should stop")
            .expect("runtime task");

        let deletes = backend
            .calls()
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Delete { .. }))
            .count();
        assert_eq!(deletes, 3);
        assert!(backend.documents("guests").is_empty());
    }

    #[tokio::test]
    async fn start_builds_runtime_from_config() {
        let backend = seeded();
        let (handle, mut events, task) = start(
            Arc::new(backend.clone()),
            CollectionsConfig::default(),
            BridgeConfig::default(),
        );
        assert_eq!(next(&mut events).await, InboundMessage::signed_out());

        handle.send(OutboundMessage::FetchMeetings).await.unwrap();

        loop {
            let message = next(&mut events).await;
            if message.channel() == "meetings-fetched" {
                break;
            }
        }
        drop(handle);
        timeout(Duration::from_secs(2), task)
            .await
            .expect("runtime should stop")
            .expect("runtime task");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn start_stream_sees_initial_state_on_multi_thread() {
        for _ in 0..200 {
            let (handle, mut events, task) = start(
                Arc::new(MockBackend::new()),
                CollectionsConfig::default(),
                BridgeConfig::default(),
            );
            let first = timeout(Duration::from_millis(500), events.recv())
                .await
                .expect("initial state timeout")
                .expect("event receive");
            assert_eq!(first, InboundMessage::signed_out());

            drop(handle);
            task.await.unwrap();
        }
    }
}
