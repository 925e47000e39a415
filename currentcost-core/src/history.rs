// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Per-sensor history store.
//!
//! The display unit reports a full complement of hour, day, month and year entries for
//! every sensor slot, even slots with nothing attached. [`SensorHistoryRecord`] merges
//! those entries across the messages of one history cycle and remembers whether any of
//! them was non-zero.

use crate::period::{PeriodKind, PeriodTag};
use crate::sensor::{SensorInstance, SensorType};
use chrono::NaiveDateTime;
use core::fmt::{self, Display};
use currentcost_error::{CurrentCostError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// One `tag → value` pair from a history `data` block.
///
/// The raw text is what gets stored and exported; the numeric value is only used to
/// decide whether the record carries real data.
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    pub tag: String,
    pub raw: String,
    pub value: f64,
}

impl Datapoint {
    /// # Errors
    /// Returns [`CurrentCostError::InvalidField`] when `raw` is not a number.
    pub fn new(tag: impl Into<String>, raw: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        let raw = raw.into();
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| CurrentCostError::invalid_field(format!("hist/data/{tag}"), raw.as_str()))?;
        Ok(Self { tag, raw, value })
    }
}

/// Accumulated history for one `(SensorType, SensorInstance)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorHistoryRecord {
    sensor_type: SensorType,
    instance: SensorInstance,
    units: String,
    last_update: Option<NaiveDateTime>,
    hour: BTreeMap<PeriodTag, String>,
    day: BTreeMap<PeriodTag, String>,
    month: BTreeMap<PeriodTag, String>,
    year: BTreeMap<PeriodTag, String>,
    has_data: bool,
}

impl SensorHistoryRecord {
    pub fn new(sensor_type: SensorType, instance: SensorInstance, units: impl Into<String>) -> Self {
        Self {
            sensor_type,
            instance,
            units: units.into(),
            last_update: None,
            hour: BTreeMap::new(),
            day: BTreeMap::new(),
            month: BTreeMap::new(),
            year: BTreeMap::new(),
            has_data: false,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn instance(&self) -> SensorInstance {
        self.instance
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    /// Receipt time of the most recent message that contributed to this record.
    pub fn last_update(&self) -> Option<NaiveDateTime> {
        self.last_update
    }

    /// True once any stored value has been strictly greater than zero.
    ///
    /// The flag latches: a later zero for the same tag does not clear it.
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Merge datapoints received at `timestamp` into the matching buckets.
    ///
    /// Existing tags are overwritten, other tags are kept. Datapoints whose tag has an
    /// unknown prefix or a non-numeric index are skipped with a warning. Returns the
    /// number of datapoints stored.
    pub fn store_datapoints<I>(&mut self, timestamp: NaiveDateTime, datapoints: I) -> usize
    where
        I: IntoIterator<Item = Datapoint>,
    {
        self.last_update = Some(timestamp);

        let mut stored = 0;
        for datapoint in datapoints {
            let Some(tag) = PeriodTag::parse(&datapoint.tag) else {
                tracing::warn!(
                    tag = %datapoint.tag,
                    value = %datapoint.raw,
                    "don't know how to handle historical tag"
                );
                continue;
            };

            if datapoint.value > 0.0 {
                self.has_data = true;
            }
            self.bucket_mut(tag.kind()).insert(tag, datapoint.raw);
            stored += 1;
        }
        stored
    }

    /// Entries of one bucket in ascending index order.
    pub fn bucket(&self, kind: PeriodKind) -> impl Iterator<Item = (&PeriodTag, &str)> + '_ {
        self.bucket_map(kind)
            .iter()
            .map(|(tag, value)| (tag, value.as_str()))
    }

    pub fn hour_data(&self) -> impl Iterator<Item = (&PeriodTag, &str)> + '_ {
        self.bucket(PeriodKind::Hour)
    }

    pub fn day_data(&self) -> impl Iterator<Item = (&PeriodTag, &str)> + '_ {
        self.bucket(PeriodKind::Day)
    }

    pub fn month_data(&self) -> impl Iterator<Item = (&PeriodTag, &str)> + '_ {
        self.bucket(PeriodKind::Month)
    }

    pub fn year_data(&self) -> impl Iterator<Item = (&PeriodTag, &str)> + '_ {
        self.bucket(PeriodKind::Year)
    }

    /// Number of stored entries across all buckets.
    pub fn len(&self) -> usize {
        PeriodKind::ALL
            .into_iter()
            .map(|kind| self.bucket_map(kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot in the shape used for JSON export.
    pub fn to_serializable(&self) -> HistoryExport {
        let export = |kind: PeriodKind| -> Vec<(String, String)> {
            self.bucket(kind)
                .map(|(tag, value)| (tag.as_str().to_string(), value.to_string()))
                .collect()
        };

        HistoryExport {
            sensor_type: self.sensor_type.code(),
            instance: self.instance.id(),
            timestamp: self.last_update.map(|ts| ts.to_string()),
            units: self.units.clone(),
            data: HistoryExportData {
                hour: export(PeriodKind::Hour),
                day: export(PeriodKind::Day),
                month: export(PeriodKind::Month),
                year: export(PeriodKind::Year),
            },
        }
    }

    /// # Errors
    /// Propagates serializer failures from `serde_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_serializable())
    }

    fn bucket_map(&self, kind: PeriodKind) -> &BTreeMap<PeriodTag, String> {
        match kind {
            PeriodKind::Hour => &self.hour,
            PeriodKind::Day => &self.day,
            PeriodKind::Month => &self.month,
            PeriodKind::Year => &self.year,
        }
    }

    fn bucket_mut(&mut self, kind: PeriodKind) -> &mut BTreeMap<PeriodTag, String> {
        match kind {
            PeriodKind::Hour => &mut self.hour,
            PeriodKind::Day => &mut self.day,
            PeriodKind::Month => &mut self.month,
            PeriodKind::Year => &mut self.year,
        }
    }
}

impl Display for SensorHistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(last_update) = self.last_update else {
            return write!(f, "Sensor: {} - No history data", self.instance);
        };

        write!(f, "Sensor: {} [{}]", self.instance, self.sensor_type)?;
        write!(f, "\nLast update: {last_update}")?;

        for kind in PeriodKind::ALL {
            let bucket = self.bucket_map(kind);
            if bucket.is_empty() {
                write!(f, "\nNo {kind} data history available")?;
                continue;
            }
            let mut heading = kind.name().to_string();
            heading[..1].make_ascii_uppercase();
            write!(f, "\n{heading} Data:")?;
            for (tag, value) in bucket {
                write!(f, "\n\t{tag} {value} {}", self.units)?;
            }
        }
        Ok(())
    }
}

/// Serializable view of a [`SensorHistoryRecord`].
///
/// Buckets are ordered `(tag, value)` pairs, ascending by numeric index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryExport {
    #[serde(rename = "type")]
    pub sensor_type: u8,
    pub instance: u8,
    pub timestamp: Option<String>,
    pub units: String,
    pub data: HistoryExportData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryExportData {
    pub hour: Vec<(String, String)>,
    pub day: Vec<(String, String)>,
    pub month: Vec<(String, String)>,
    pub year: Vec<(String, String)>,
}
