// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Protocol engine for CurrentCost energy monitors.
//!
//! The display unit writes one XML document per line. This crate turns such a line into
//! typed events without touching any I/O:
//!
//! # Overview
//!
//! - **[`classify`]** - Parse a line and tag it as periodic or history
//! - **[`extract_periodic`]** - Stateless extraction of a real-time reading
//! - **[`HistoryAggregator`]** - Merges a history burst per sensor type and completes it
//!   after a quiet period
//! - **[`SensorHistoryRecord`]** - Hour, day, month and year buckets for one sensor slot
//! - **[`MonitorHandler`]** - Consumer callbacks for both event kinds
//!
//! # Example
//!
//! ```
//! use currentcost_core::{classify, extract_periodic, Clock, MessageKind, SensorData};
//!
//! let line = b"<msg><src>CC128-v0.11</src><dsb>00089</dsb><time>13:02:39</time>\
//!     <tmpr>18.7</tmpr><sensor>0</sensor><id>01234</id><type>1</type>\
//!     <ch1><watts>00345</watts></ch1><ch2><watts>02151</watts></ch2></msg>";
//!
//! let message = classify(line).unwrap();
//! assert_eq!(message.kind, MessageKind::Periodic);
//!
//! let update = extract_periodic(&message.document, Clock::utc().now(), 3).unwrap();
//! match update.sensor_data {
//!     SensorData::Electricity(channels) => assert_eq!(channels.len(), 2),
//!     other => panic!("unexpected payload {other:?}"),
//! }
//! ```

pub mod aggregator;
pub mod clock;
pub mod device;
pub mod handler;
pub mod history;
pub mod history_message;
pub mod message;
pub mod period;
pub mod periodic;
pub mod sensor;

pub use aggregator::{HistoryAggregator, HistoryCycle, DEFAULT_HISTORY_TIMEOUT};
pub use clock::Clock;
pub use device::DeviceInfo;
pub use handler::MonitorHandler;
pub use history::{Datapoint, HistoryExport, HistoryExportData, SensorHistoryRecord};
pub use history_message::{HistoryBlock, HistoryMessage};
pub use message::{classify, ClassifiedMessage, Element, MessageKind};
pub use period::{PeriodKind, PeriodTag};
pub use periodic::{extract_periodic, ChannelReading, PeriodicUpdate, SensorData};
pub use sensor::{SensorInstance, SensorType};
