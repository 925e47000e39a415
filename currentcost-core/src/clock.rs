// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::{Local, NaiveDateTime, Utc};

/// Wall clock used to stamp messages on receipt.
///
/// The device's own `time` element has no date and drifts, so every message is stamped
/// with host time instead, either UTC or local time without an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    utc: bool,
}

impl Clock {
    pub const fn utc() -> Self {
        Self { utc: true }
    }

    pub const fn local() -> Self {
        Self { utc: false }
    }

    pub const fn new(use_utc_timestamps: bool) -> Self {
        Self {
            utc: use_utc_timestamps,
        }
    }

    pub const fn is_utc(&self) -> bool {
        self.utc
    }

    pub fn now(&self) -> NaiveDateTime {
        if self.utc {
            Utc::now().naive_utc()
        } else {
            Local::now().naive_local()
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::utc()
    }
}
