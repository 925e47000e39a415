// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::timer::Timer;
use std::time::Duration;
use tokio::time::{sleep, Instant, Sleep};

/// Tokio-backed timer.
///
/// Instants come from `tokio::time`, so a paused runtime clock (`tokio::time::pause`)
/// also freezes history timeouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    type Sleep = Sleep;

    type Instant = Instant;

    fn sleep_future(&self, duration: Duration) -> Self::Sleep {
        sleep(duration)
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }
}
