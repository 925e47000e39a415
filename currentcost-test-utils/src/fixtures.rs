// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Device lines in the CC128 / EnviR dialect.

use chrono::{NaiveDate, NaiveDateTime};

/// Periodic reading from a whole-house transmitter with three clamps.
pub const PERIODIC_WHOLE_HOUSE: &str = "<msg><src>CC128-v0.11</src><dsb>00089</dsb>\
<time>13:02:39</time><tmpr>18.7</tmpr><sensor>0</sensor><id>01234</id><type>1</type>\
<ch1><watts>00345</watts></ch1><ch2><watts>02151</watts></ch2><ch3><watts>00000</watts></ch3></msg>";

/// Periodic reading from an OptiSmart impulse sensor.
pub const PERIODIC_OPTISMART: &str = "<msg><src>CC128-v0.11</src><dsb>00089</dsb>\
<time>13:02:45</time><tmpr>18.7</tmpr><sensor>2</sensor><id>02345</id><type>2</type>\
<imp>0000012345</imp><ipu>1000</ipu></msg>";

/// One message of an electricity history burst.
pub const HISTORY_ELECTRICITY: &str = "<msg><src>CC128-v0.11</src><dsb>00089</dsb>\
<time>13:10:50</time><hist><dsw>00032</dsw><type>1</type><units>kwhr</units>\
<data><sensor>0</sensor><h024>001.1</h024><h022>000.9</h022><h020>000.3</h020><h018>000.4</h018></data>\
<data><sensor>1</sensor><h024>000.0</h024><h022>000.0</h022><h020>000.0</h020><h018>000.0</h018></data>\
</hist></msg>";

/// Periodic message for an electricity sensor.
///
/// `channels` lists `(channel, watts)` pairs; channels not listed are left out of the
/// document.
pub fn electricity_line(instance: u8, channels: &[(u8, &str)]) -> String {
    let readings: String = channels
        .iter()
        .map(|(channel, watts)| format!("<ch{channel}><watts>{watts}</watts></ch{channel}>"))
        .collect();
    periodic_line("1", instance, &readings)
}

pub fn optismart_line(instance: u8, impulses: &str, impulses_per_unit: &str) -> String {
    periodic_line(
        "2",
        instance,
        &format!("<imp>{impulses}</imp><ipu>{impulses_per_unit}</ipu>"),
    )
}

/// Periodic message with an arbitrary `type` text and payload.
pub fn periodic_line(sensor_type: &str, instance: u8, payload: &str) -> String {
    format!(
        "<msg><src>CC128-v0.11</src><dsb>00089</dsb><time>13:02:39</time><tmpr>21.3</tmpr>\
         <sensor>{instance}</sensor><id>00077</id><type>{sensor_type}</type>{payload}</msg>"
    )
}

/// Builder for history lines.
///
/// ```
/// use currentcost_test_utils::fixtures::HistoryLine;
///
/// let line = HistoryLine::new("1")
///     .data(1, &[("h01", "012"), ("h02", "000")])
///     .build();
/// assert!(line.contains("<h01>012</h01>"));
/// ```
#[derive(Debug, Clone)]
pub struct HistoryLine {
    sensor_type: String,
    units: Option<String>,
    dsw: Option<String>,
    blocks: Vec<String>,
}

impl HistoryLine {
    pub fn new(sensor_type: &str) -> Self {
        Self {
            sensor_type: sensor_type.to_string(),
            units: Some("kwhr".to_string()),
            dsw: Some("00032".to_string()),
            blocks: Vec::new(),
        }
    }

    pub fn units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    pub fn without_units(mut self) -> Self {
        self.units = None;
        self
    }

    pub fn dsw(mut self, dsw: &str) -> Self {
        self.dsw = Some(dsw.to_string());
        self
    }

    /// Add a `data` block for `instance` with `(tag, value)` datapoints.
    pub fn data(self, instance: u8, datapoints: &[(&str, &str)]) -> Self {
        self.raw_data(&instance.to_string(), datapoints)
    }

    /// Add a `data` block with arbitrary `sensor` text.
    pub fn raw_data(mut self, sensor: &str, datapoints: &[(&str, &str)]) -> Self {
        let points: String = datapoints
            .iter()
            .map(|(tag, value)| format!("<{tag}>{value}</{tag}>"))
            .collect();
        self.blocks
            .push(format!("<data><sensor>{sensor}</sensor>{points}</data>"));
        self
    }

    pub fn build(&self) -> String {
        let dsw = self
            .dsw
            .as_ref()
            .map(|dsw| format!("<dsw>{dsw}</dsw>"))
            .unwrap_or_default();
        let units = self
            .units
            .as_ref()
            .map(|units| format!("<units>{units}</units>"))
            .unwrap_or_default();
        format!(
            "<msg><src>CC128-v0.11</src><dsb>00089</dsb><time>13:10:50</time>\
             <hist>{dsw}<type>{}</type>{units}{}</hist></msg>",
            self.sensor_type,
            self.blocks.concat()
        )
    }
}

/// A fixed receipt time for deterministic assertions.
pub fn timestamp(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 17)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .expect("valid fixture timestamp")
}
