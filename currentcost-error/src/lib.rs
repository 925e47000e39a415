// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the CurrentCost protocol handler
//!
//! This crate defines the root [`CurrentCostError`] type shared by every crate in the
//! workspace. Per-message failures (malformed XML, missing fields, unknown sensor types)
//! are recoverable: the offending line is logged and dropped and processing continues
//! with the next line. Configuration failures are fatal and only occur at startup.
//!
//! # Examples
//!
//! ```
//! use currentcost_error::{CurrentCostError, Result};
//!
//! fn read_instance(text: &str) -> Result<u8> {
//!     text.parse()
//!         .map_err(|_| CurrentCostError::invalid_field("sensor", text))
//! }
//!
//! assert!(read_instance("x").unwrap_err().is_extraction());
//! ```

use core::fmt::Display;

/// Root error type for all CurrentCost operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurrentCostError {
    /// A line could not be decoded as an XML document
    ///
    /// Carries the offending line so it can be logged next to the reason.
    #[error("Failed to parse message xml: {reason}")]
    Parse {
        /// What the XML reader rejected
        reason: String,
        /// The raw line, lossily decoded
        line: String,
    },

    /// A required element was absent from an otherwise well-formed message
    #[error("Missing required field '{field}'")]
    MissingField {
        /// Element path, e.g. `hist/type`
        field: String,
    },

    /// An element was present but its text could not be interpreted
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidField {
        /// Element path
        field: String,
        /// Text found in the element
        value: String,
    },

    /// The `type` element named a sensor type this handler does not know
    #[error("Unknown sensor type: {value}")]
    UnknownSensorType {
        /// Text of the `type` element
        value: String,
    },

    /// The sensor type is known but carries no periodic payload this handler reads
    #[error("Don't know how to handle sensor type: {sensor_type}")]
    UnsupportedSensorType {
        /// Display name of the sensor type
        sensor_type: String,
    },

    /// The configuration could not be loaded or failed validation
    #[error("Configuration error: {context}")]
    Configuration {
        /// Which setting or file was at fault
        context: String,
    },

    /// The serial transport failed to open or read
    #[error("Transport error: {context}")]
    Transport {
        /// Description of the failure
        context: String,
    },
}

impl CurrentCostError {
    /// Create a parse error for the given line
    pub fn parse(reason: impl Into<String>, line: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            line: line.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an unknown sensor type error
    pub fn unknown_sensor_type(value: impl Into<String>) -> Self {
        Self::UnknownSensorType {
            value: value.into(),
        }
    }

    /// Create an unsupported sensor type error
    pub fn unsupported_sensor_type(sensor_type: impl Into<String>) -> Self {
        Self::UnsupportedSensorType {
            sensor_type: sensor_type.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(context: impl Into<String>) -> Self {
        Self::Configuration {
            context: context.into(),
        }
    }

    /// Create a transport error
    pub fn transport(context: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
        }
    }

    /// Check if this error only affects the message that produced it
    ///
    /// Recoverable errors are logged and the message dropped; the device will
    /// send the next reading on its own schedule.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }

    /// Check if this error should stop the process
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if this error names a sensor type the handler cannot process
    ///
    /// These are logged as warnings rather than errors.
    #[must_use]
    pub const fn is_sensor_type(&self) -> bool {
        matches!(
            self,
            Self::UnknownSensorType { .. } | Self::UnsupportedSensorType { .. }
        )
    }

    /// Check if this error came from reading fields out of a well-formed message
    #[must_use]
    pub const fn is_extraction(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidField { .. })
    }
}

/// Specialized Result type for CurrentCost operations
pub type Result<T> = std::result::Result<T, CurrentCostError>;

/// Helper trait for attaching CurrentCost context to foreign errors
///
/// # Examples
///
/// ```
/// use currentcost_error::{CurrentCostError, ResultExt};
///
/// let raw: Result<u32, std::num::ParseIntError> = "fast".parse::<u32>();
/// let err = raw.configuration("baud_rate").unwrap_err();
/// assert!(matches!(err, CurrentCostError::Configuration { .. }));
/// assert!(err.to_string().contains("baud_rate"));
/// ```
pub trait ResultExt<T> {
    /// Convert the error into [`CurrentCostError::Configuration`]
    ///
    /// # Errors
    /// Returns `Err(CurrentCostError)` if the underlying result is `Err`.
    fn configuration(self, context: impl Into<String>) -> Result<T>;

    /// Convert the error into [`CurrentCostError::Transport`]
    ///
    /// # Errors
    /// Returns `Err(CurrentCostError)` if the underlying result is `Err`.
    fn transport(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Display,
{
    fn configuration(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CurrentCostError::configuration(format!("{}: {e}", context.into())))
    }

    fn transport(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CurrentCostError::transport(format!("{}: {e}", context.into())))
    }
}
