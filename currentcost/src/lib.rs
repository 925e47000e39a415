// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! CurrentCost energy monitor.
//!
//! Reads the newline-delimited XML a CurrentCost display unit (CC128, EnviR) writes to
//! its serial port and turns it into typed callbacks on a [`MonitorHandler`].
//!
//! # Overview
//!
//! - **[`MonitorConfig`]** - `[current_cost]` table of a TOML file
//! - **[`SerialTransport`]** - Reconnecting serial reader producing [`TransportEvent`]s
//! - **[`Monitor`]** - Single-task event loop: line framing, classification, periodic
//!   extraction and history aggregation
//! - **[`LoggingHandler`]** - Ready-made handler that logs every event
//!
//! The protocol engine itself lives in [`currentcost_core`] and is re-exported here.
//!
//! # Example
//!
//! ```rust,no_run
//! use currentcost::{HistoryCycle, Monitor, MonitorConfig, MonitorHandler, PeriodicUpdate, SerialTransport};
//! use tokio_util::sync::CancellationToken;
//!
//! struct Printer;
//!
//! impl MonitorHandler for Printer {
//!     fn on_periodic_update(&mut self, update: PeriodicUpdate) {
//!         println!("{update}");
//!     }
//!
//!     fn on_history_update(&mut self, cycle: HistoryCycle) {
//!         for record in cycle.records.values() {
//!             println!("{record}");
//!         }
//!     }
//! }
//!
//! # async fn example() -> currentcost_error::Result<()> {
//! let config = MonitorConfig::new("/dev/ttyUSB0");
//! let cancel = CancellationToken::new();
//! let transport = SerialTransport::from_config(&config).spawn(cancel.clone())?;
//! Monitor::new(&config, Printer).run(transport, cancel).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging_handler;
pub mod monitor;
pub mod transport;

pub use config::MonitorConfig;
pub use logging_handler::LoggingHandler;
pub use monitor::Monitor;
pub use transport::{LineBuffer, SerialTransport, TransportEvent, MAX_LINE_LENGTH};

pub use currentcost_core::{
    ChannelReading, DeviceInfo, HistoryCycle, MonitorHandler, PeriodicUpdate, SensorData,
    SensorHistoryRecord, SensorInstance, SensorType,
};
pub use currentcost_error::{CurrentCostError, Result};
