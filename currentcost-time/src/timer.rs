// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt::Debug;
use core::future::Future;
use core::ops::{Add, Sub};
use core::time::Duration;

/// Source of monotonic time and one-shot sleeps.
///
/// The history aggregator never reads the wall clock to decide when a cycle is
/// complete; it only compares instants produced by a `Timer`. Tests swap in a paused
/// runtime clock through the same trait.
pub trait Timer: Clone + Send + Sync + Debug + 'static {
    type Sleep: Future<Output = ()> + Send;

    type Instant: Copy
        + Debug
        + Ord
        + Send
        + Sync
        + Add<Duration, Output = Self::Instant>
        + Sub<Self::Instant, Output = Duration>;

    /// Creates a future that completes once `duration` has elapsed.
    /// The future is stored and polled by [`KeyedDebounce`](crate::KeyedDebounce).
    fn sleep_future(&self, duration: Duration) -> Self::Sleep;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the instant `duration` from now.
    fn deadline_after(&self, duration: Duration) -> Self::Instant {
        self.now() + duration
    }
}
