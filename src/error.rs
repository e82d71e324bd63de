//! Errors reported by the BME280 driver.
//!
//! Transport failures are wrapped unchanged, everything else describes a
//! configuration or framing problem detected by the driver itself.

use std::fmt;

#[derive(Debug)]
pub enum Bme280Error {
    /// A setting was given a value outside the closed set of its field.
    InvalidSetting { field: &'static str, value: String },
    /// A raw data block read from the device had the wrong length.
    MalformedReadout { register: u8, expected: usize, actual: usize },
    /// A calibration block read from the device had the wrong length.
    MalformedCalibration { register: u8, expected: usize, actual: usize },
    /// The chip id register did not hold the BME280 id.
    UnexpectedChipId { found: u8, expected: u8 },
    /// A forced conversion did not complete within the polling budget.
    MeasurementTimeout,
    /// The bus transport failed.
    Transport(std::io::Error),
}

impl Bme280Error {
    pub(crate) fn invalid_setting(field: &'static str, value: impl fmt::Display) -> Self {
        Self::InvalidSetting { field, value: value.to_string() }
    }
}

impl fmt::Display for Bme280Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidSetting { field, value } => write!(f, "Invalid {field} setting '{value}'"),
            Self::MalformedReadout { register, expected, actual } => write!(f,
                "Malformed readout at register {register:#04x}: expected {expected} bytes, got {actual}"),
            Self::MalformedCalibration { register, expected, actual } => write!(f,
                "Malformed calibration data at register {register:#04x}: expected {expected} bytes, got {actual}"),
            Self::UnexpectedChipId { found, expected } => write!(f,
                "Found unknown chip id '{found:#04x}', expected '{expected:#04x}'"),
            Self::MeasurementTimeout => write!(f, "Timed out waiting for measurement to complete"),
            Self::Transport(err) => write!(f, "Transport error: {err}"),
        }
    }
}

impl std::error::Error for Bme280Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Bme280Error {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err)
    }
}
