// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::aggregator::HistoryCycle;
use crate::periodic::PeriodicUpdate;

/// Consumer of decoded monitor events.
///
/// Both methods run synchronously on the monitor's event loop and must not block; hand
/// long work to another task.
pub trait MonitorHandler {
    /// Called once per successfully extracted periodic message.
    fn on_periodic_update(&mut self, update: PeriodicUpdate);

    /// Called once per completed history cycle, even when no sensor reported data.
    fn on_history_update(&mut self, cycle: HistoryCycle);
}

impl<H: MonitorHandler + ?Sized> MonitorHandler for Box<H> {
    fn on_periodic_update(&mut self, update: PeriodicUpdate) {
        (**self).on_periodic_update(update);
    }

    fn on_history_update(&mut self, cycle: HistoryCycle) {
        (**self).on_history_update(cycle);
    }
}
