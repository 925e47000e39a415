// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::recording::MonitorEvent;
use currentcost::TransportEvent;
use futures::stream::StreamExt;
use futures::Stream;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::time::sleep;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Sender and stream halves of an in-memory transport.
pub fn transport_channel() -> (
    UnboundedSender<TransportEvent>,
    UnboundedReceiverStream<TransportEvent>,
) {
    let (tx, rx) = unbounded_channel();
    (tx, UnboundedReceiverStream::new(rx))
}

/// Wrap a line as a transport data chunk, newline included.
pub fn line_event(line: &str) -> TransportEvent {
    let mut bytes = line.as_bytes().to_vec();
    bytes.extend_from_slice(b"\r\n");
    TransportEvent::Data(bytes)
}

pub async fn assert_no_event_emitted<S>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = MonitorEvent> + Unpin,
{
    tokio::select! {
        event = stream.next() => {
            panic!("Unexpected event emitted, expected no output: {event:?}");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}

pub async fn next_event<S>(stream: &mut S) -> MonitorEvent
where
    S: Stream<Item = MonitorEvent> + Unpin,
{
    stream.next().await.expect("expected next event")
}

/// Let spawned tasks run until they block, without advancing paused time.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
