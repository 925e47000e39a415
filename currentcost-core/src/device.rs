// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::message::Element;

/// Metadata the display unit repeats in every message.
///
/// Fields hold the most recent value seen and stay `None` until a message carrying
/// them arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Firmware / model string (`src`)
    pub source: Option<String>,
    /// Days since the display unit was first powered (`dsb`)
    pub days_since_birth: Option<String>,
    /// Days since history was last wiped (`hist/dsw`, history messages only)
    pub days_since_wiped: Option<String>,
}

impl DeviceInfo {
    /// Remember metadata from a classified document. Absent elements leave the
    /// previous value untouched.
    pub fn observe(&mut self, document: &Element) {
        if let Some(source) = document.child_text("src") {
            self.source = Some(source.to_string());
        }
        if let Some(dsb) = document.child_text("dsb") {
            self.days_since_birth = Some(dsb.to_string());
        }
        if let Some(dsw) = document.child("hist").and_then(|hist| hist.child_text("dsw")) {
            self.days_since_wiped = Some(dsw.to_string());
        }
    }
}
