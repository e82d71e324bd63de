//! Fixed-point compensation formulas of the BME280 datasheet.
//!
//! All right shifts are arithmetic (rounding towards negative infinity) and all
//! arithmetic wraps on overflow the way two's-complement C code does, so results
//! are bit-exact with the reference implementation for any input.

use log::warn;

use super::bme280_calib::{CalibData, CalibHumidity, CalibPressure, CalibTemperature, RawData};

// -- humidity clamp before the final shift, 100 %RH in Q22.10 << 12
const BME280_HUMIDITY_MAX_UNSHIFTED: i32 = 419_430_400;

/// Fine resolution temperature, shared by pressure and humidity compensation.
///
/// Only `compensate_temperature` produces one, so pressure and humidity can not
/// be computed before the temperature of the same cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TFine(pub i32);

/// Returns the temperature in 0.01 °C and the fine temperature.
pub fn compensate_temperature(temperature_raw: i32, calib: &CalibTemperature) -> (i32, TFine) {
    let dig_t1 = calib.dig_t1 as i32;
    let dig_t2 = calib.dig_t2 as i32;
    let dig_t3 = calib.dig_t3 as i32;
    let var1a = (temperature_raw >> 3).wrapping_sub(dig_t1 << 1);
    let var1 = var1a.wrapping_mul(dig_t2) >> 11;
    let var2a = (temperature_raw >> 4).wrapping_sub(dig_t1);
    let var2 = (var2a.wrapping_mul(var2a) >> 12).wrapping_mul(dig_t3) >> 14;
    let t_fine = var1.wrapping_add(var2);
    let temperature = t_fine.wrapping_mul(5).wrapping_add(128) >> 8;
    (temperature, TFine(t_fine))
}

/// Returns the pressure in Pa as unsigned Q24.8, i.e. divide by 256 for Pa.
///
/// A result of 0 means the compensation is undefined for these coefficients,
/// it is never a valid reading.
pub fn compensate_pressure(pressure_raw: i32, t_fine: TFine, calib: &CalibPressure) -> u32 {
    let dig_p1 = calib.dig_p1 as i64;
    let dig_p2 = calib.dig_p2 as i64;
    let dig_p3 = calib.dig_p3 as i64;
    let dig_p4 = calib.dig_p4 as i64;
    let dig_p5 = calib.dig_p5 as i64;
    let dig_p6 = calib.dig_p6 as i64;
    let dig_p7 = calib.dig_p7 as i64;
    let dig_p8 = calib.dig_p8 as i64;
    let dig_p9 = calib.dig_p9 as i64;

    let var1 = (t_fine.0 as i64) - 128_000;
    let var2 = var1.wrapping_mul(var1).wrapping_mul(dig_p6);
    let var2 = var2.wrapping_add(var1.wrapping_mul(dig_p5) << 17);
    let var2 = var2.wrapping_add(dig_p4 << 35);
    let var1 = (var1.wrapping_mul(var1).wrapping_mul(dig_p3) >> 8)
        .wrapping_add(var1.wrapping_mul(dig_p2) << 12);
    let var1 = ((1i64 << 47).wrapping_add(var1)).wrapping_mul(dig_p1) >> 33;
    if var1 == 0 {
        // -- avoid division by zero
        return 0;
    }
    let pressure = 1_048_576 - (pressure_raw as i64);
    let pressure = ((pressure << 31).wrapping_sub(var2)).wrapping_mul(3125).wrapping_div(var1);
    let var1 = dig_p9.wrapping_mul(pressure >> 13).wrapping_mul(pressure >> 13) >> 25;
    let var2 = dig_p8.wrapping_mul(pressure) >> 19;
    let pressure = (pressure.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add(dig_p7 << 4);
    pressure as u32
}

/// Returns the relative humidity in %RH as unsigned Q22.10, i.e. divide by 1024.
/// The result never exceeds 102400.
pub fn compensate_humidity(humidity_raw: i32, t_fine: TFine, calib: &CalibHumidity) -> u32 {
    let dig_h1 = calib.dig_h1 as i32;
    let dig_h2 = calib.dig_h2 as i32;
    let dig_h3 = calib.dig_h3 as i32;
    let dig_h4 = calib.dig_h4 as i32;
    let dig_h5 = calib.dig_h5 as i32;
    let dig_h6 = calib.dig_h6 as i32;

    let var1 = t_fine.0.wrapping_sub(76_800);
    let var2 = (humidity_raw << 14)
        .wrapping_sub(dig_h4 << 20)
        .wrapping_sub(dig_h5.wrapping_mul(var1))
        .wrapping_add(16_384) >> 15;
    let var3 = ((var1.wrapping_mul(dig_h6) >> 10)
        .wrapping_mul((var1.wrapping_mul(dig_h3) >> 11).wrapping_add(32_768)) >> 10)
        .wrapping_add(2_097_152);
    let var4 = var3.wrapping_mul(dig_h2).wrapping_add(8192) >> 14;
    let var5 = var2.wrapping_mul(var4);
    let var6 = ((var5 >> 15).wrapping_mul(var5 >> 15) >> 7).wrapping_mul(dig_h1) >> 4;
    let humidity = var5.wrapping_sub(var6).clamp(0, BME280_HUMIDITY_MAX_UNSHIFTED);
    (humidity >> 12) as u32
}

/// One compensated reading. Channels that were skipped, or whose compensation
/// is undefined, are `None`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bme280Measurement {
    /// 0.01 °C
    pub temperature: Option<i32>,
    /// Pa, Q24.8
    pub pressure: Option<u32>,
    /// %RH, Q22.10
    pub humidity: Option<u32>,
}

impl Bme280Measurement {
    pub fn temperature_celsius(&self) -> Option<f64> {
        self.temperature.map(|t| t as f64 / 100.0)
    }

    pub fn pressure_pa(&self) -> Option<f64> {
        self.pressure.map(|p| p as f64 / 256.0)
    }

    pub fn pressure_hpa(&self) -> Option<f64> {
        self.pressure.map(|p| p as f64 / 25600.0)
    }

    pub fn humidity_percent(&self) -> Option<f64> {
        self.humidity.map(|h| h as f64 / 1024.0)
    }
}

/// Compensates a full raw triplet, temperature first.
pub fn compensate(raw: &RawData, calib: &CalibData) -> Bme280Measurement {
    if raw.temperature_skipped() {
        warn!("Temperature measurement skipped, pressure and humidity can not be compensated");
        return Bme280Measurement { temperature: None, pressure: None, humidity: None };
    }
    let (temperature, t_fine) = compensate_temperature(raw.temperature, &calib.temperature);
    let pressure = if raw.pressure_skipped() {
        None
    } else {
        match compensate_pressure(raw.pressure, t_fine, &calib.pressure) {
            0 => {
                warn!("Pressure compensation undefined for calibration data {:?}", calib.pressure);
                None
            }
            pressure => Some(pressure),
        }
    };
    let humidity = if raw.humidity_skipped() {
        None
    } else {
        Some(compensate_humidity(raw.humidity, t_fine, &calib.humidity))
    };
    Bme280Measurement { temperature: Some(temperature), pressure, humidity }
}
