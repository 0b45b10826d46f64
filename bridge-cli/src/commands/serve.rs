//! Host the bridge over stdio.
//!
//! Every stdin line is one outbound port message; every inbound port
//! message is written to stdout as one line.

use std::sync::Arc;

use anyhow::{Context, Result};
use bridge_backend::{Backend, FirebaseBackend, MockBackend};
use bridge_runtime::{BridgeHandle, EventStream};
use bridge_types::OutboundMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::config::Config;

/// Run the serve command.
pub async fn run(config: Config, mock: bool) -> Result<()> {
    config.validate(mock)?;
    let backend = build_backend(&config, mock)?;

    let (handle, events, runtime) =
        bridge_runtime::start(backend, config.collections, config.bridge);
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        pump_events(events, &mut stdout).await
    });

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = pump_commands(stdin, &handle) => {
            let count = result?;
            tracing::info!(count, "Input closed");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
    }

    drop(handle);
    runtime.await.context("bridge runtime panicked")?;
    let written = writer.await.context("event writer panicked")??;
    tracing::debug!(written, "Event stream closed");
    Ok(())
}

fn build_backend(config: &Config, mock: bool) -> Result<Arc<dyn Backend>> {
    if mock {
        let backend = MockBackend::new();
        config.mock.seed(&backend, &config.collections);
        tracing::info!("Using in-memory backend");
        return Ok(Arc::new(backend));
    }

    let firebase = config
        .firebase
        .clone()
        .context("missing [firebase] section")?;
    let backend = FirebaseBackend::new(firebase).context("failed to set up Firebase backend")?;
    Ok(Arc::new(backend))
}

/// Forward JSON lines from `reader` to the bridge until end of input.
///
/// Malformed lines are logged and skipped. Returns the number of
/// messages forwarded.
pub async fn pump_commands<R>(reader: R, handle: &BridgeHandle) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match OutboundMessage::from_json(line) {
            Ok(message) => {
                tracing::debug!(channel = message.channel(), "Port message received");
                handle.send(message).await?;
                forwarded += 1;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Skipping malformed port message");
            }
        }
    }

    Ok(forwarded)
}

/// Write every inbound message to `writer` as one JSON line until the
/// bridge closes its event stream. Returns the number of lines written.
pub async fn pump_events<W>(mut events: EventStream, writer: &mut W) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;

    loop {
        match events.recv().await {
            Ok(message) => {
                let mut line = message.to_json()?;
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
                written += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event writer lagged, messages dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_runtime::{BridgeConfig, CollectionsConfig};
    use bridge_types::{Document, InboundMessage};

    #[tokio::test]
    async fn round_trip_over_lines() {
        let backend = MockBackend::new();
        backend.insert_document("meetings", Document::new("m1").with_field("name", "Standup"));
        backend.insert_document("meetings", Document::new("m2").with_field("name", "Retro"));
        backend.insert_document("guests", Document::new("g1").with_field("meetingId", "m1"));

        let (handle, events, runtime) = bridge_runtime::start(
            Arc::new(backend.clone()),
            CollectionsConfig::default(),
            BridgeConfig::default(),
        );

        let input: &[u8] = b"{\"channel\":\"fetch-meetings\"}\n\nnot json\n{\"channel\":\"teleport\"}\n";
        let forwarded = pump_commands(input, &handle).await.unwrap();
        assert_eq!(forwarded, 1);

        drop(handle);
        runtime.await.unwrap();

        let mut output: Vec<u8> = Vec::new();
        pump_events(events, &mut output).await.unwrap();

        let messages: Vec<InboundMessage> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| InboundMessage::from_json(line).unwrap())
            .collect();
        let channels: Vec<&str> = messages.iter().map(|m| m.channel()).collect();
        assert_eq!(channels[0], "user-signed-out");
        assert!(channels.contains(&"meetings-fetched"));

        let fetched = messages
            .iter()
            .find_map(|m| match m {
                InboundMessage::MeetingsFetched(meetings) => Some(meetings.clone()),
                _ => None,
            })
            .unwrap();
        let ids: Vec<&str> = fetched.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn delete_line_runs_cascade() {
        let backend = MockBackend::new();
        backend.insert_document("meetings", Document::new("m1"));
        backend.insert_document("guests", Document::new("g1").with_field("meetingId", "m1"));
        backend.insert_document("guests", Document::new("g2").with_field("meetingId", "m1"));

        let (handle, _events, runtime) = bridge_runtime::start(
            Arc::new(backend.clone()),
            CollectionsConfig::default(),
            BridgeConfig::default(),
        );

        let input: &[u8] = b"{\"channel\":\"delete-meeting\",\"payload\":\"m1\"}\n";
        pump_commands(input, &handle).await.unwrap();
        drop(handle);
        runtime.await.unwrap();

        assert_eq!(backend.delete_calls().len(), 3);
        assert!(backend.documents("meetings").is_empty());
        assert!(backend.documents("guests").is_empty());
    }

    #[test]
    fn firebase_backend_requires_section() {
        let err = build_backend(&Config::default(), false)
            .err()
            .expect("missing section should fail");
        assert!(err.to_string().contains("[firebase]"));
    }
}
