// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Timer abstraction and per-key debounce used to detect the end of a history cycle.
//!
//! The CurrentCost device announces no end marker for its hourly history burst; a cycle
//! is complete once no further history message for the same sensor type has arrived
//! within a quiet period. [`KeyedDebounce`] implements exactly that: one restartable
//! deadline per key, yielded as a stream of expired keys.
//!
//! # Overview
//!
//! - **`Timer` trait** - Runtime-agnostic source of instants and sleeps
//! - **`TokioTimer`** - Tokio implementation (feature `runtime-tokio`, on by default)
//! - **`KeyedDebounce<K, TM>`** - Map of restartable one-shot deadlines, polled as a `Stream`

mod debounce;
pub mod runtimes;
pub mod timer;

pub use debounce::{Armed, KeyedDebounce};
pub use timer::Timer;

#[cfg(feature = "runtime-tokio")]
pub use runtimes::TokioTimer;
