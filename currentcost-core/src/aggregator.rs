// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! History cycle aggregation.
//!
//! Roughly once an hour the display unit emits a burst of history messages, several per
//! sensor type, with no marker for the last one. [`HistoryAggregator`] merges the burst
//! into one record per sensor slot and treats a sensor type's cycle as finished once
//! `timeout` has passed without another message of that type.
//!
//! Per sensor type the aggregator is either idle or accumulating. A history message
//! moves an idle type to accumulating and arms its timer; further messages restart the
//! timer from scratch. When the timer fires the type returns to idle and the records
//! that contain data are handed out as a [`HistoryCycle`].

use crate::history::SensorHistoryRecord;
use crate::history_message::HistoryMessage;
use crate::message::Element;
use crate::sensor::{SensorInstance, SensorType};
use chrono::NaiveDateTime;
use core::time::Duration;
use currentcost_error::Result;
use currentcost_time::{Armed, KeyedDebounce, Timer, TokioTimer};
use futures::StreamExt;
use std::collections::BTreeMap;

/// Quiet period after the last history message of a type before its cycle completes.
pub const DEFAULT_HISTORY_TIMEOUT: Duration = Duration::from_secs(20);

/// The outcome of a completed history cycle for one sensor type.
///
/// Only records with real data are included; `records` may be empty when every slot
/// reported zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryCycle {
    pub sensor_type: SensorType,
    pub records: BTreeMap<SensorInstance, SensorHistoryRecord>,
}

impl HistoryCycle {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, instance: SensorInstance) -> Option<&SensorHistoryRecord> {
        self.records.get(&instance)
    }
}

/// Stateful merger of history messages with one debounce timer per sensor type.
///
/// Poll [`next_completed`](Self::next_completed) to receive cycles as their timers
/// expire. Dropping the aggregator, or calling [`shutdown`](Self::shutdown), discards
/// every armed timer without completing it.
///
/// # Example
///
/// ```rust,no_run
/// use currentcost_core::{classify, HistoryAggregator};
///
/// # async fn example(line: &[u8], now: chrono::NaiveDateTime) -> currentcost_error::Result<()> {
/// let mut aggregator = HistoryAggregator::default();
/// let message = classify(line)?;
/// aggregator.ingest(&message.document, now)?;
///
/// if let Some(cycle) = aggregator.next_completed().await {
///     println!("{} sensors reported {}", cycle.len(), cycle.sensor_type);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HistoryAggregator<TM: Timer = TokioTimer> {
    cycles: BTreeMap<SensorType, BTreeMap<SensorInstance, SensorHistoryRecord>>,
    timers: KeyedDebounce<SensorType, TM>,
}

impl Default for HistoryAggregator<TokioTimer> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_TIMEOUT, TokioTimer)
    }
}

impl<TM: Timer> HistoryAggregator<TM> {
    pub fn new(timeout: Duration, timer: TM) -> Self {
        Self {
            cycles: BTreeMap::new(),
            timers: KeyedDebounce::new(timeout, timer),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timers.duration()
    }

    /// Validate a history document and merge it into the pending cycle for its type.
    ///
    /// Returns the sensor type whose timer was armed.
    ///
    /// # Errors
    /// Any validation failure from [`HistoryMessage::from_document`]. Nothing is merged
    /// and no timer is touched when this returns an error.
    pub fn ingest(&mut self, document: &Element, timestamp: NaiveDateTime) -> Result<SensorType> {
        let message = HistoryMessage::from_document(document)?;
        Ok(self.merge(message, timestamp))
    }

    /// Merge an already validated message and arm the timer for its type.
    pub fn merge(&mut self, message: HistoryMessage, timestamp: NaiveDateTime) -> SensorType {
        let sensor_type = message.sensor_type;
        let records = self.cycles.entry(sensor_type).or_default();

        for block in message.blocks {
            tracing::debug!(
                sensor_type = %sensor_type,
                instance = %block.instance,
                datapoints = block.datapoints.len(),
                "processing historical data"
            );
            records
                .entry(block.instance)
                .or_insert_with(|| {
                    SensorHistoryRecord::new(sensor_type, block.instance, message.units.as_str())
                })
                .store_datapoints(timestamp, block.datapoints);
        }

        match self.timers.arm(sensor_type) {
            Armed::Started => {
                tracing::debug!(sensor_type = %sensor_type, "history cycle started");
            }
            Armed::Restarted => {
                tracing::trace!(sensor_type = %sensor_type, "history cycle timer restarted");
            }
        }
        sensor_type
    }

    /// Finish the cycle for `sensor_type` now.
    ///
    /// The timer is cancelled if still armed. The returned cycle holds clones of the
    /// records with data; the accumulated records themselves stay in place and keep
    /// merging into later cycles of the same type.
    pub fn complete(&mut self, sensor_type: SensorType) -> HistoryCycle {
        self.timers.cancel(&sensor_type);

        let records = self
            .cycles
            .get(&sensor_type)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, record)| record.has_data())
                    .map(|(instance, record)| (*instance, record.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let cycle = HistoryCycle {
            sensor_type,
            records,
        };
        tracing::debug!(
            sensor_type = %sensor_type,
            with_data = cycle.len(),
            "history update cycle completed"
        );
        cycle
    }

    /// Wait for the next sensor type whose quiet period elapses and complete it.
    ///
    /// Stays pending while nothing is accumulating. Cancel safe: dropping the future
    /// before it resolves loses no cycle.
    pub async fn next_completed(&mut self) -> Option<HistoryCycle> {
        let sensor_type = self.timers.next().await?;
        Some(self.complete(sensor_type))
    }

    /// True while a timer is armed for `sensor_type`.
    pub fn is_accumulating(&self, sensor_type: SensorType) -> bool {
        self.timers.is_armed(&sensor_type)
    }

    /// When the pending cycle for `sensor_type` will complete, if one is armed.
    pub fn deadline(&self, sensor_type: SensorType) -> Option<TM::Instant> {
        self.timers.deadline(&sensor_type)
    }

    /// Every record accumulated for `sensor_type`, including those without data.
    pub fn records(
        &self,
        sensor_type: SensorType,
    ) -> Option<&BTreeMap<SensorInstance, SensorHistoryRecord>> {
        self.cycles.get(&sensor_type)
    }

    /// Cancel every armed timer so that no cycle completes after teardown.
    ///
    /// Returns the number of cycles discarded.
    pub fn shutdown(&mut self) -> usize {
        let discarded = self.timers.cancel_all();
        if discarded > 0 {
            tracing::debug!(discarded, "discarded pending history cycles");
        }
        discarded
    }
}
