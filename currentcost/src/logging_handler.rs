// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use currentcost_core::{HistoryCycle, MonitorHandler, PeriodicUpdate};

/// Handler that logs every event at `info`.
///
/// Useful for checking a device is wired up before writing a real consumer.
#[derive(Debug, Clone, Default)]
pub struct LoggingHandler {
    periodic_updates: u64,
    history_updates: u64,
}

impl LoggingHandler {
    pub fn periodic_updates(&self) -> u64 {
        self.periodic_updates
    }

    pub fn history_updates(&self) -> u64 {
        self.history_updates
    }
}

impl MonitorHandler for LoggingHandler {
    fn on_periodic_update(&mut self, update: PeriodicUpdate) {
        self.periodic_updates += 1;
        tracing::info!(%update, "periodic update");
    }

    fn on_history_update(&mut self, cycle: HistoryCycle) {
        self.history_updates += 1;
        if cycle.is_empty() {
            tracing::info!(sensor_type = %cycle.sensor_type, "history update without sensor data");
            return;
        }
        for record in cycle.records.values() {
            tracing::info!(sensor_type = %cycle.sensor_type, "history update\n{record}");
        }
    }
}
