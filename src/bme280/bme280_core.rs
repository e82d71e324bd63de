#[allow(unused_imports)]
use log::{debug, info, warn};

use crate::error::Bme280Error;
use crate::i2cio::{self, Transport};

use super::bme280_calib::{CalibData, RawData};
use super::bme280_compensation::{compensate, Bme280Measurement};
use super::bme280_enums::*;
use super::bme280_registers::*;

// -- the start-up time after reset is 2ms
const BME280_STARTUP_DELAY_MS: u32 = 2;
const BME280_NVM_COPY_POLLS: usize = 10;
const BME280_FORCED_POLL_DELAY_MS: u32 = 5;
// -- worst case conversion with all channels at x16 is below 115ms
const BME280_FORCED_MAX_POLLS: usize = 100;

pub struct BME280<T: Transport> {
    // -- bus transport
    transport: T,
    // -- device address
    device_addr: Bme280DeviceAddress,
    // -- calibration data
    calib_data: CalibData,
    // -- control register image last written to the device
    settings: ControlRegisters,
}

impl<T: Transport> BME280<T> {

    pub fn new(transport: T, device_addr: Bme280DeviceAddress) -> Result<BME280<T>, Bme280Error> {
        let mut bme280 = BME280 {
            transport,
            device_addr,
            calib_data: Default::default(),
            settings: ControlRegisters::new(),
        };
        // -- check if device is available by reading chip id
        let chip_id = bme280.read_byte(BME280_REG_PART_ID)?;
        if chip_id != BME280_CHIP_ID {
            return Err(Bme280Error::UnexpectedChipId { found: chip_id, expected: BME280_CHIP_ID });
        }
        debug!("Got chip id: {chip_id:#x}");
        // -- do a soft reset since it's in an unknown state
        bme280.soft_reset()?;
        // -- get calibration data
        bme280.calib_data = bme280.get_calib_data()?;
        Ok(bme280)
    }

    pub fn get_device_addr(&self) -> Bme280DeviceAddress {
        self.device_addr
    }

    pub fn get_calib_data(&mut self) -> Result<CalibData, Bme280Error> {
        let temp_data = self.read_block(BME280_REG_TEMP_CALIB_DATA, BME280_LEN_TEMP_CALIB_DATA)?;
        let press_data = self.read_block(BME280_REG_PRESS_CALIB_DATA, BME280_LEN_PRESS_CALIB_DATA)?;
        let hum_data_1 = self.read_block(BME280_REG_HUMIDITY_CALIB_DATA_1, BME280_LEN_HUMIDITY_CALIB_DATA_1)?;
        let hum_data_2 = self.read_block(BME280_REG_HUMIDITY_CALIB_DATA_2, BME280_LEN_HUMIDITY_CALIB_DATA_2)?;
        let calib_data = CalibData::parse(&temp_data, &press_data, &hum_data_1, &hum_data_2)?;
        debug!("Got calibration data: {calib_data:#?}");
        Ok(calib_data)
    }

    /// Calibration read during initialization.
    pub fn calib_data(&self) -> &CalibData {
        &self.calib_data
    }

    /// Control registers as last written by this driver.
    pub fn settings(&self) -> &ControlRegisters {
        &self.settings
    }

    /// Gives the transport back.
    pub fn release(self) -> T {
        self.transport
    }

    fn read_byte(&mut self, register: u8) -> Result<u8, Bme280Error> {
        let reg_data = self.transport.read_registers(self.device_addr.value(), register, 1)?;
        match reg_data.first() {
            Some(reg_val) if reg_data.len() == 1 => Ok(*reg_val),
            _ => Err(Bme280Error::MalformedReadout { register, expected: 1, actual: reg_data.len() }),
        }
    }

    fn read_block(&mut self, register: u8, len: usize) -> Result<Vec<u8>, Bme280Error> {
        Ok(self.transport.read_registers(self.device_addr.value(), register, len)?)
    }

    fn write_byte(&mut self, register: u8, reg_val: u8) -> Result<(), Bme280Error> {
        Ok(self.transport.write_register(self.device_addr.value(), register, reg_val)?)
    }

    fn soft_reset(&mut self) -> Result<(), Bme280Error> {
        // -- initiate soft reset
        debug!("Initiating soft reset");
        self.write_byte(BME280_REG_RESET, BME280_SOFT_RESET_COMMAND)?;
        // -- all control registers are zero after reset
        self.settings = ControlRegisters::new();
        // -- wait for the device to startup
        i2cio::delay(BME280_STARTUP_DELAY_MS);
        // -- calibration data is only valid once the NVM copy is done
        for _ in 0..BME280_NVM_COPY_POLLS {
            if !self.is_updating()? {
                return Ok(());
            }
            i2cio::delay(BME280_STARTUP_DELAY_MS);
        }
        warn!("NVM data still being copied after soft reset");
        Ok(())
    }

    /// Writes config, ctrl_hum and ctrl_meas, in this order.
    pub fn apply_settings(&mut self, settings: &ControlRegisters) -> Result<(), Bme280Error> {
        for (register, reg_val) in settings.register_writes() {
            debug!("Setting register {register:#x} to value {reg_val:#010b}");
            self.write_byte(register, reg_val)?;
        }
        self.settings = *settings;
        Ok(())
    }

    pub fn set_sensor_mode(&mut self, sensor_mode: Bme280SensorMode) -> Result<(), Bme280Error> {
        let mut settings = self.settings;
        settings.set_sensor_mode(sensor_mode)?;
        let ctrl_meas = settings.ctrl_meas();
        debug!("Setting register BME280_REG_CTRL_MEAS {BME280_REG_CTRL_MEAS:#x} to value {ctrl_meas:#010b}");
        self.write_byte(BME280_REG_CTRL_MEAS, ctrl_meas)?;
        self.settings = settings;
        Ok(())
    }

    pub fn get_sensor_mode(&mut self) -> Result<Bme280SensorMode, Bme280Error> {
        // -- read current value of ctrl_meas
        let ctrl_meas = self.read_byte(BME280_REG_CTRL_MEAS)?;
        debug!("Got register BME280_REG_CTRL_MEAS {BME280_REG_CTRL_MEAS:#x} value {ctrl_meas:#010b}");
        ControlRegisters::from_bytes([0, 0, ctrl_meas]).sensor_mode()
    }

    /// Reads config, ctrl_hum and ctrl_meas back from the device.
    pub fn read_settings(&mut self) -> Result<ControlRegisters, Bme280Error> {
        let config = self.read_byte(BME280_REG_CONFIG)?;
        let ctrl_hum = self.read_byte(BME280_REG_CTRL_HUM)?;
        let ctrl_meas = self.read_byte(BME280_REG_CTRL_MEAS)?;
        Ok(ControlRegisters::from_bytes([config, ctrl_hum, ctrl_meas]))
    }

    pub fn is_measuring(&mut self) -> Result<bool, Bme280Error> {
        let status = self.read_byte(BME280_REG_STATUS)?;
        Ok((status & BME280_STATUS_MEASURING) > 0)
    }

    pub fn is_updating(&mut self) -> Result<bool, Bme280Error> {
        let status = self.read_byte(BME280_REG_STATUS)?;
        Ok((status & BME280_STATUS_IM_UPDATE) > 0)
    }

    pub fn get_data_raw(&mut self) -> Result<RawData, Bme280Error> {
        // -- burst read pressure, temperature and humidity in one go
        let reg_data = self.read_block(BME280_REG_PRESS_DATA, BME280_LEN_P_T_H_DATA)?;
        debug!("Read {} bytes sensor data", reg_data.len());
        RawData::from_burst(&reg_data)
    }

    pub fn get_measurement(&mut self) -> Result<Bme280Measurement, Bme280Error> {
        let raw_data = self.get_data_raw()?;
        debug!("Got raw data: {raw_data:?}");
        Ok(compensate(&raw_data, &self.calib_data))
    }

    /// Triggers one conversion and waits until the device is back in sleep mode.
    pub fn measure_forced(&mut self) -> Result<Bme280Measurement, Bme280Error> {
        self.set_sensor_mode(Bme280SensorMode::Forced)?;
        for _ in 0..BME280_FORCED_MAX_POLLS {
            i2cio::delay(BME280_FORCED_POLL_DELAY_MS);
            if self.get_sensor_mode()? == Bme280SensorMode::Sleep && !self.is_measuring()? {
                // -- the device returned to sleep on its own
                let mut settings = self.settings;
                settings.set_sensor_mode(Bme280SensorMode::Sleep)?;
                self.settings = settings;
                return self.get_measurement();
            }
        }
        Err(Bme280Error::MeasurementTimeout)
    }

    /// One forced conversion of the temperature alone, filter off and pressure
    /// and humidity skipped. Returns the temperature in 0.01 °C.
    pub fn read_temperature_forced(&mut self) -> Result<Option<i32>, Bme280Error> {
        let mut settings = self.settings;
        settings.set_irr_filter(Bme280IrrFilter::FilterOff)?;
        settings.set_osr_humidity(Bme280OverSampling::Skip)?;
        settings.set_osr_pressure(Bme280OverSampling::Skip)?;
        settings.set_osr_temperature(Bme280OverSampling::Oversampling1x)?;
        settings.set_sensor_mode(Bme280SensorMode::Sleep)?;
        self.apply_settings(&settings)?;
        Ok(self.measure_forced()?.temperature)
    }
}
