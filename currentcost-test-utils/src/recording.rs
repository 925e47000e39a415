// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use currentcost_core::{HistoryCycle, MonitorHandler, PeriodicUpdate};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// A callback observed by [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    Periodic(PeriodicUpdate),
    History(HistoryCycle),
}

impl MonitorEvent {
    pub fn into_periodic(self) -> PeriodicUpdate {
        match self {
            Self::Periodic(update) => update,
            Self::History(cycle) => panic!("expected periodic update, got {cycle:?}"),
        }
    }

    pub fn into_history(self) -> HistoryCycle {
        match self {
            Self::History(cycle) => cycle,
            Self::Periodic(update) => panic!("expected history cycle, got {update:?}"),
        }
    }
}

/// Handler that forwards every callback into a channel.
#[derive(Debug, Clone)]
pub struct RecordingHandler {
    tx: UnboundedSender<MonitorEvent>,
}

impl RecordingHandler {
    pub fn channel() -> (Self, UnboundedReceiverStream<MonitorEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, UnboundedReceiverStream::new(rx))
    }
}

impl MonitorHandler for RecordingHandler {
    fn on_periodic_update(&mut self, update: PeriodicUpdate) {
        let _ = self.tx.send(MonitorEvent::Periodic(update));
    }

    fn on_history_update(&mut self, cycle: HistoryCycle) {
        let _ = self.tx.send(MonitorEvent::History(cycle));
    }
}
