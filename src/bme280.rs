//! BME280 combined humidity, pressure and temperature sensor.
//!
//! The register model and the integer compensation are pure and work on
//! bytes only; [`BME280`] drives a device through any [`Transport`](crate::i2cio::Transport).

mod bme280_calib;
mod bme280_compensation;
mod bme280_core;
mod bme280_enums;
mod bme280_registers;

pub use bme280_calib::*;
pub use bme280_compensation::*;
pub use bme280_core::*;
pub use bme280_enums::*;
pub use bme280_registers::*;
