// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::history::Datapoint;
use crate::message::Element;
use crate::period::PeriodTag;
use crate::sensor::{SensorInstance, SensorType};
use currentcost_error::{CurrentCostError, Result};

/// A fully validated history message.
///
/// Building one touches no aggregation state, so a message that fails validation
/// leaves every pending cycle exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryMessage {
    pub sensor_type: SensorType,
    pub units: String,
    pub days_since_wiped: Option<String>,
    pub blocks: Vec<HistoryBlock>,
}

/// One `data` block: the datapoints reported for a single sensor slot.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBlock {
    pub instance: SensorInstance,
    pub datapoints: Vec<Datapoint>,
}

impl HistoryMessage {
    /// Validate the `hist` section of a classified history document.
    ///
    /// A missing `units` element falls back to the sensor type's own unit string.
    ///
    /// # Errors
    /// - [`CurrentCostError::MissingField`] for a missing `hist`, `hist/type` or
    ///   `hist/data/sensor`
    /// - [`CurrentCostError::InvalidField`] for a non-integer type, an instance outside
    ///   0..=9 or a non-numeric value under an `h`/`d`/`m`/`y` tag
    /// - [`CurrentCostError::UnknownSensorType`] for a type code outside the enumeration
    pub fn from_document(document: &Element) -> Result<Self> {
        let hist = document
            .child("hist")
            .ok_or_else(|| CurrentCostError::missing_field("hist"))?;

        let sensor_type =
            SensorType::from_text("hist/type", hist.required_text("type", "hist/type")?)?;
        let units = hist
            .child_text("units")
            .map_or_else(|| sensor_type.units().to_string(), str::to_string);
        let days_since_wiped = hist.child_text("dsw").map(str::to_string);

        let blocks = hist
            .children_named("data")
            .map(HistoryBlock::from_element)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sensor_type,
            units,
            days_since_wiped,
            blocks,
        })
    }
}

impl HistoryBlock {
    fn from_element(data: &Element) -> Result<Self> {
        let instance = SensorInstance::from_text(
            "hist/data/sensor",
            data.required_text("sensor", "hist/data/sensor")?,
        )?;

        let datapoints = data
            .children
            .iter()
            .filter(|child| child.name != "sensor")
            .filter(|child| {
                let known = PeriodTag::parse(&child.name).is_some();
                if !known {
                    tracing::warn!(
                        tag = %child.name,
                        value = %child.text,
                        "don't know how to handle historical tag"
                    );
                }
                known
            })
            .map(|child| Datapoint::new(child.name.as_str(), child.text.as_str()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            instance,
            datapoints,
        })
    }
}
