// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Periodic update extraction.
//!
//! Stateless: every call reads one document and either produces a complete
//! [`PeriodicUpdate`] or an error. Nothing is buffered between calls.

use crate::message::Element;
use crate::sensor::{SensorInstance, SensorType};
use chrono::NaiveDateTime;
use core::fmt::{self, Display};
use currentcost_error::{CurrentCostError, Result};

/// Power reading for one clamp channel, in the device's textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReading {
    /// 1-based channel number
    pub channel: u8,
    pub watts: String,
}

/// Sensor-specific payload of a periodic update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorData {
    /// Readings for the channels present, in channel order. Absent channels are
    /// omitted, never zero-filled.
    Electricity(Vec<ChannelReading>),
    /// Impulse count and impulses-per-unit, each `None` when the element is absent
    OptiSmart {
        impulses: Option<String>,
        impulses_per_unit: Option<String>,
    },
}

/// One real-time reading from the display unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicUpdate {
    /// Receipt time on this host, not the device clock
    pub timestamp: NaiveDateTime,
    /// Display unit temperature, as sent
    pub temperature: String,
    pub sensor_type: SensorType,
    pub sensor_instance: SensorInstance,
    pub sensor_data: SensorData,
    /// Firmware / source identifier (`src`)
    pub source: String,
    /// Days since the display unit was first powered (`dsb`)
    pub days_since_birth: String,
    /// Radio id of the transmitter (`id`), when present
    pub radio_id: Option<String>,
}

impl Display for PeriodicUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sensor {} [{}] temperature {}",
            self.timestamp, self.sensor_instance, self.sensor_type, self.temperature
        )?;
        match &self.sensor_data {
            SensorData::Electricity(channels) => {
                for reading in channels {
                    write!(f, ", ch{} {} W", reading.channel, reading.watts)?;
                }
                Ok(())
            }
            SensorData::OptiSmart {
                impulses,
                impulses_per_unit,
            } => write!(
                f,
                ", imp {} ipu {}",
                impulses.as_deref().unwrap_or("-"),
                impulses_per_unit.as_deref().unwrap_or("-")
            ),
        }
    }
}

/// Extract a periodic update from a classified document.
///
/// The whole-house sensor reports up to `clamp_count` channels, every other instance
/// reports channel 1 only. The device `time` element is ignored in favour of
/// `timestamp`.
///
/// # Errors
/// - [`CurrentCostError::MissingField`] when `src`, `dsb`, `tmpr`, `sensor` or `type`
///   is absent
/// - [`CurrentCostError::InvalidField`] for a non-integer or out-of-range `sensor` or a
///   non-integer `type`
/// - [`CurrentCostError::UnknownSensorType`] for a type outside the enumeration
/// - [`CurrentCostError::UnsupportedSensorType`] for the temperature pseudo sensor,
///   which has no periodic payload of its own
pub fn extract_periodic(
    document: &Element,
    timestamp: NaiveDateTime,
    clamp_count: u8,
) -> Result<PeriodicUpdate> {
    let source = document.required_text("src", "src")?.to_string();
    let days_since_birth = document.required_text("dsb", "dsb")?.to_string();
    let temperature = document.required_text("tmpr", "tmpr")?.to_string();
    let sensor_instance =
        SensorInstance::from_text("sensor", document.required_text("sensor", "sensor")?)?;
    let radio_id = document.child_text("id").map(str::to_string);
    let sensor_type = SensorType::from_text("type", document.required_text("type", "type")?)?;

    let sensor_data = match sensor_type {
        SensorType::Electricity => {
            let channels = if sensor_instance.is_whole_house() {
                clamp_count
            } else {
                1
            };
            SensorData::Electricity(read_channels(document, channels))
        }
        SensorType::OptiSmart => SensorData::OptiSmart {
            impulses: document.child_text("imp").map(str::to_string),
            impulses_per_unit: document.child_text("ipu").map(str::to_string),
        },
        SensorType::Temperature => {
            return Err(CurrentCostError::unsupported_sensor_type(sensor_type.name()));
        }
    };

    Ok(PeriodicUpdate {
        timestamp,
        temperature,
        sensor_type,
        sensor_instance,
        sensor_data,
        source,
        days_since_birth,
        radio_id,
    })
}

fn read_channels(document: &Element, channels: u8) -> Vec<ChannelReading> {
    (1..=channels)
        .filter_map(|channel| {
            let element = document.child(&format!("ch{channel}"))?;
            match element.child_text("watts") {
                Some(watts) => Some(ChannelReading {
                    channel,
                    watts: watts.to_string(),
                }),
                None => {
                    tracing::debug!(channel, "channel element without watts reading");
                    None
                }
            }
        })
        .collect()
}
