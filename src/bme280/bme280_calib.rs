use crate::error::Bme280Error;

use super::bme280_registers::*;

// -- shift values
const BME280_12_BIT_SHIFT: u8 = 12;
const BME280_8_BIT_SHIFT: u8 = 8;
const BME280_4_BIT_SHIFT: u8 = 4;

// -- raw output of a skipped measurement
pub const BME280_SKIPPED_TEMP_PRESS: i32 = 0x80000;
pub const BME280_SKIPPED_HUMIDITY: i32 = 0x8000;

fn concat_bytes(msb: u8, lsb: u8) -> u16 {
    ((msb as u16) << 8) | (lsb as u16)
}

fn check_calib_len(register: u8, reg_data: &[u8], expected: usize) -> Result<(), Bme280Error> {
    if reg_data.len() != expected {
        return Err(Bme280Error::MalformedCalibration { register, expected, actual: reg_data.len() });
    }
    Ok(())
}

fn check_readout_len(register: u8, reg_data: &[u8], expected: usize) -> Result<(), Bme280Error> {
    if reg_data.len() != expected {
        return Err(Bme280Error::MalformedReadout { register, expected, actual: reg_data.len() });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibTemperature {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
}

impl CalibTemperature {
    pub fn parse(reg_data: &[u8]) -> Result<Self, Bme280Error> {
        check_calib_len(BME280_REG_TEMP_CALIB_DATA, reg_data, BME280_LEN_TEMP_CALIB_DATA)?;
        Ok(CalibTemperature {
            dig_t1: concat_bytes(reg_data[1], reg_data[0]),
            dig_t2: concat_bytes(reg_data[3], reg_data[2]) as i16,
            dig_t3: concat_bytes(reg_data[5], reg_data[4]) as i16,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibPressure {
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
}

impl CalibPressure {
    pub fn parse(reg_data: &[u8]) -> Result<Self, Bme280Error> {
        check_calib_len(BME280_REG_PRESS_CALIB_DATA, reg_data, BME280_LEN_PRESS_CALIB_DATA)?;
        let word = |i: usize| concat_bytes(reg_data[i + 1], reg_data[i]);
        Ok(CalibPressure {
            dig_p1: word(0),
            dig_p2: word(2) as i16,
            dig_p3: word(4) as i16,
            dig_p4: word(6) as i16,
            dig_p5: word(8) as i16,
            dig_p6: word(10) as i16,
            dig_p7: word(12) as i16,
            dig_p8: word(14) as i16,
            dig_p9: word(16) as i16,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibHumidity {
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibHumidity {
    /// `reg_data_1` is the single byte at 0xa1, `reg_data_2` the block at 0xe1.
    pub fn parse(reg_data_1: &[u8], reg_data_2: &[u8]) -> Result<Self, Bme280Error> {
        check_calib_len(BME280_REG_HUMIDITY_CALIB_DATA_1, reg_data_1, BME280_LEN_HUMIDITY_CALIB_DATA_1)?;
        check_calib_len(BME280_REG_HUMIDITY_CALIB_DATA_2, reg_data_2, BME280_LEN_HUMIDITY_CALIB_DATA_2)?;
        let dig_h1 = reg_data_1[0];
        let dig_h2 = concat_bytes(reg_data_2[1], reg_data_2[0]) as i16;
        let dig_h3 = reg_data_2[2];
        // -- dig_h4 and dig_h5 are signed 12 bit values sharing the nibbles of 0xe5
        let dig_h4_msb = ((reg_data_2[3] as i8) as i16) * 16;
        let dig_h4_lsb = (reg_data_2[4] & 0x0f) as i16;
        let dig_h4 = dig_h4_msb | dig_h4_lsb;
        let dig_h5_msb = ((reg_data_2[5] as i8) as i16) * 16;
        let dig_h5_lsb = (reg_data_2[4] >> BME280_4_BIT_SHIFT) as i16;
        let dig_h5 = dig_h5_msb | dig_h5_lsb;
        let dig_h6 = reg_data_2[6] as i8;
        Ok(CalibHumidity { dig_h1, dig_h2, dig_h3, dig_h4, dig_h5, dig_h6 })
    }
}

/// Factory calibration, read once after reset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibData {
    pub temperature: CalibTemperature,
    pub pressure: CalibPressure,
    pub humidity: CalibHumidity,
}

impl CalibData {
    pub fn parse(temp_data: &[u8], press_data: &[u8], hum_data_1: &[u8], hum_data_2: &[u8])
        -> Result<Self, Bme280Error> {
        Ok(CalibData {
            temperature: CalibTemperature::parse(temp_data)?,
            pressure: CalibPressure::parse(press_data)?,
            humidity: CalibHumidity::parse(hum_data_1, hum_data_2)?,
        })
    }
}

/// Un-compensated ADC values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawData {
    pub pressure: i32,
    pub temperature: i32,
    pub humidity: i32,
}

fn parse_20_bits(reg_data: &[u8]) -> i32 {
    let data_msb = (reg_data[0] as i32) << BME280_12_BIT_SHIFT;
    let data_lsb = (reg_data[1] as i32) << BME280_4_BIT_SHIFT;
    let data_xlsb = (reg_data[2] as i32) >> BME280_4_BIT_SHIFT;
    data_msb | data_lsb | data_xlsb
}

fn parse_16_bits(reg_data: &[u8]) -> i32 {
    ((reg_data[0] as i32) << BME280_8_BIT_SHIFT) | reg_data[1] as i32
}

impl RawData {
    pub fn parse(press_data: &[u8], temp_data: &[u8], hum_data: &[u8]) -> Result<Self, Bme280Error> {
        check_readout_len(BME280_REG_PRESS_DATA, press_data, BME280_LEN_PRESS_DATA)?;
        check_readout_len(BME280_REG_TEMP_DATA, temp_data, BME280_LEN_TEMP_DATA)?;
        check_readout_len(BME280_REG_HUMIDITY_DATA, hum_data, BME280_LEN_HUMIDITY_DATA)?;
        Ok(RawData {
            pressure: parse_20_bits(press_data),
            temperature: parse_20_bits(temp_data),
            humidity: parse_16_bits(hum_data),
        })
    }

    /// Parses the 8 byte burst read starting at 0xf7.
    pub fn from_burst(reg_data: &[u8]) -> Result<Self, Bme280Error> {
        check_readout_len(BME280_REG_PRESS_DATA, reg_data, BME280_LEN_P_T_H_DATA)?;
        Self::parse(&reg_data[0..3], &reg_data[3..6], &reg_data[6..8])
    }

    pub fn temperature_skipped(&self) -> bool {
        self.temperature == BME280_SKIPPED_TEMP_PRESS
    }

    pub fn pressure_skipped(&self) -> bool {
        self.pressure == BME280_SKIPPED_TEMP_PRESS
    }

    pub fn humidity_skipped(&self) -> bool {
        self.humidity == BME280_SKIPPED_HUMIDITY
    }
}
