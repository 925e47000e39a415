// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the CurrentCost workspace.
//!
//! Designed for development and testing only, not for production code.
//!
//! # Key Types
//!
//! - [`fixtures`] - Device lines and a [`HistoryLine`](fixtures::HistoryLine) builder
//! - [`RecordingHandler`] - Forwards monitor callbacks into a channel as [`MonitorEvent`]s
//! - [`transport_channel`] - In-memory transport for driving a monitor
//!
//! ```rust
//! use currentcost_core::MonitorHandler;
//! use currentcost_test_utils::RecordingHandler;
//!
//! let (handler, _events) = RecordingHandler::channel();
//! fn assert_handler<H: MonitorHandler>(_: &H) {}
//! assert_handler(&handler);
//! ```

pub mod fixtures;
pub mod helpers;
pub mod recording;

pub use helpers::{assert_no_event_emitted, line_event, next_event, settle, transport_channel};
pub use recording::{MonitorEvent, RecordingHandler};
