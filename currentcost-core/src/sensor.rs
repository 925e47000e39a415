// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt::{self, Display};
use currentcost_error::{CurrentCostError, Result};

/// Kind of sensor reporting through the display unit.
///
/// The discriminants are the values the device sends in its `type` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorType {
    /// Pseudo sensor for the display unit's own thermometer
    Temperature = 0,
    /// Whole-house transmitter and individual appliance monitors
    Electricity = 1,
    /// Impulse sensor reading a meter's LED
    OptiSmart = 2,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [Self::Temperature, Self::Electricity, Self::OptiSmart];

    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Electricity => "Electricity",
            Self::OptiSmart => "OptiSmart",
        }
    }

    /// Unit string reported alongside readings of this type.
    #[must_use]
    pub const fn units(self) -> &'static str {
        match self {
            Self::Temperature => "C",
            Self::Electricity => "Watts",
            Self::OptiSmart => "ipu",
        }
    }

    /// Resolve a device type code.
    ///
    /// # Errors
    /// Returns [`CurrentCostError::UnknownSensorType`] for codes outside the enumeration.
    pub fn from_code(code: i64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sensor_type| i64::from(sensor_type.code()) == code)
            .ok_or_else(|| CurrentCostError::unknown_sensor_type(code.to_string()))
    }

    /// Parse the text of a `type` element.
    ///
    /// # Errors
    /// Non-integer text is an [`CurrentCostError::InvalidField`] for `field`; an integer
    /// outside the enumeration is an [`CurrentCostError::UnknownSensorType`].
    pub fn from_text(field: &str, text: &str) -> Result<Self> {
        let code = text
            .trim()
            .parse::<i64>()
            .map_err(|_| CurrentCostError::invalid_field(field, text))?;
        Self::from_code(code)
    }

    /// Display name for a raw type code, `"Unknown"` if it is not recognised.
    pub fn name_for_raw(code: i64) -> &'static str {
        match Self::from_code(code) {
            Ok(sensor_type) => sensor_type.name(),
            Err(_) => {
                tracing::warn!(code, "invalid sensor type, can't return name");
                "Unknown"
            }
        }
    }

    /// Unit string for a raw type code, `"Unknown"` if it is not recognised.
    pub fn units_for_raw(code: i64) -> &'static str {
        match Self::from_code(code) {
            Ok(sensor_type) => sensor_type.units(),
            Err(_) => {
                tracing::warn!(code, "invalid sensor type, can't return units");
                "Unknown"
            }
        }
    }
}

impl Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sensor slot on the display unit: 0 is the whole-house transmitter, 1 through 9 are
/// individual appliance monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorInstance(u8);

impl SensorInstance {
    pub const WHOLE_HOUSE: SensorInstance = SensorInstance(0);
    pub const MAX: u8 = 9;

    /// # Errors
    /// Returns [`CurrentCostError::InvalidField`] when `id` is above [`Self::MAX`].
    pub fn new(id: u8) -> Result<Self> {
        if id > Self::MAX {
            return Err(CurrentCostError::invalid_field("sensor", id.to_string()));
        }
        Ok(Self(id))
    }

    /// Parse the text of a `sensor` element.
    ///
    /// # Errors
    /// Returns [`CurrentCostError::InvalidField`] for `field` when the text is not an
    /// integer in 0..=9.
    pub fn from_text(field: &str, text: &str) -> Result<Self> {
        text.trim()
            .parse::<u8>()
            .ok()
            .filter(|id| *id <= Self::MAX)
            .map(Self)
            .ok_or_else(|| CurrentCostError::invalid_field(field, text))
    }

    #[must_use]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_whole_house(self) -> bool {
        self.0 == Self::WHOLE_HOUSE.0
    }
}

impl Display for SensorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
