// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::timer::Timer;
use core::fmt::{self, Debug};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use core::time::Duration;
use futures::Stream;
use std::collections::BTreeMap;

/// Whether [`KeyedDebounce::arm`] started a new timer or restarted a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Armed {
    Started,
    Restarted,
}

struct PendingDeadline<TM: Timer> {
    deadline: TM::Instant,
    sleep: Pin<Box<TM::Sleep>>,
}

/// Trailing debounce with one independent timer per key.
///
/// Each key is either idle or armed with a single deadline. Arming an idle key
/// schedules a one-shot fire after the configured duration; arming an armed key
/// replaces its sleep with a fresh one, so the deadline always reflects the most
/// recent call. There is never more than one live timer per key and keys never
/// cancel each other.
///
/// As a [`Stream`], `KeyedDebounce` yields each key once its quiet period elapses,
/// removing it from the armed set in the same step. The stream never terminates:
/// with nothing armed it stays pending until a key is armed.
///
/// # Example
///
/// ```rust,no_run
/// use currentcost_time::{KeyedDebounce, TokioTimer};
/// use futures::StreamExt;
/// use std::time::Duration;
///
/// # async fn example() {
/// let mut timers = KeyedDebounce::new(Duration::from_secs(20), TokioTimer);
/// timers.arm("electricity");
/// timers.arm("electricity"); // restarts, does not add a second timer
///
/// let expired = timers.next().await;
/// assert_eq!(expired, Some("electricity"));
/// # }
/// ```
pub struct KeyedDebounce<K, TM: Timer> {
    duration: Duration,
    timer: TM,
    pending: BTreeMap<K, PendingDeadline<TM>>,
    waker: Option<Waker>,
}

impl<K, TM> KeyedDebounce<K, TM>
where
    K: Ord + Clone,
    TM: Timer,
{
    pub fn new(duration: Duration, timer: TM) -> Self {
        Self {
            duration,
            timer,
            pending: BTreeMap::new(),
            waker: None,
        }
    }

    /// Quiet period required before a key fires.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn timer(&self) -> &TM {
        &self.timer
    }

    /// Start the timer for `key`, or restart it if already armed.
    ///
    /// A restart is a full reset to `duration` from now, not an extension of the
    /// remaining time.
    pub fn arm(&mut self, key: K) -> Armed {
        let deadline = self.timer.deadline_after(self.duration);
        let sleep = Box::pin(self.timer.sleep_future(self.duration));
        let previous = self
            .pending
            .insert(key, PendingDeadline { deadline, sleep });

        if let Some(waker) = self.waker.take() {
            waker.wake();
        }

        match previous {
            Some(_) => Armed::Restarted,
            None => Armed::Started,
        }
    }

    /// Drop the timer for `key` without firing it.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Drop every armed timer without firing. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Instant at which `key` will fire, if armed.
    pub fn deadline(&self, key: &K) -> Option<TM::Instant> {
        self.pending.get(key).map(|pending| pending.deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// Sleeps are boxed, nothing is structurally pinned.
impl<K, TM: Timer> Unpin for KeyedDebounce<K, TM> {}

impl<K, TM> Stream for KeyedDebounce<K, TM>
where
    K: Ord + Clone,
    TM: Timer,
{
    type Item = K;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        let mut expired = None;
        for (key, pending) in this.pending.iter_mut() {
            if pending.sleep.as_mut().poll(cx).is_ready() {
                expired = Some(key.clone());
                break;
            }
        }

        match expired {
            Some(key) => {
                this.pending.remove(&key);
                Poll::Ready(Some(key))
            }
            None => {
                this.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<K: Debug, TM: Timer> Debug for KeyedDebounce<K, TM> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedDebounce")
            .field("duration", &self.duration)
            .field(
                "pending",
                &self
                    .pending
                    .iter()
                    .map(|(key, pending)| (key, pending.deadline))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
