use i2c_linux::I2c;
use log::debug;
use std::fs::File;
use std::path::Path;
use std::{thread, time};

/// Register level access to a device on a two-wire bus.
pub trait Transport {
    fn write_register(&mut self, dev_addr: u16, register: u8, value: u8) -> Result<(), std::io::Error>;
    fn read_registers(&mut self, dev_addr: u16, register: u8, len: usize) -> Result<Vec<u8>, std::io::Error>;
}

pub fn get_bus(bus_path: &Path) -> Result<I2c<File>, std::io::Error> {
    I2c::from_path(bus_path)
}

pub fn set_slave(i2c: &mut I2c<File>, dev_addr: u16) -> Result<(), std::io::Error> {
    i2c.smbus_set_slave_address(dev_addr, false)
}

pub fn read_byte(i2c: &mut I2c<File>, register: u8) -> Result<u8, std::io::Error> {
    i2c.smbus_read_byte_data(register)
}

pub fn write_byte(i2c: &mut I2c<File>, register: u8, data: u8) -> Result<(), std::io::Error> {
    i2c.smbus_write_byte_data(register, data)
}

pub fn delay(milli_secs: u32) {
    let delay = time::Duration::from_millis(milli_secs as u64);
    thread::sleep(delay);
}

/// `Transport` on a Linux i2c-dev character device.
pub struct LinuxI2cBus {
    i2c: I2c<File>,
    // -- slave address currently selected on the bus
    slave_addr: Option<u16>,
}

impl LinuxI2cBus {
    pub fn new(bus_path: &Path) -> Result<LinuxI2cBus, std::io::Error> {
        let i2c = get_bus(bus_path)?;
        Ok(LinuxI2cBus { i2c, slave_addr: None })
    }

    fn select(&mut self, dev_addr: u16) -> Result<(), std::io::Error> {
        if self.slave_addr != Some(dev_addr) {
            debug!("Selecting slave address {dev_addr:#x}");
            set_slave(&mut self.i2c, dev_addr)?;
            self.slave_addr = Some(dev_addr);
        }
        Ok(())
    }
}

impl Transport for LinuxI2cBus {
    fn write_register(&mut self, dev_addr: u16, register: u8, value: u8) -> Result<(), std::io::Error> {
        self.select(dev_addr)?;
        write_byte(&mut self.i2c, register, value)
    }

    fn read_registers(&mut self, dev_addr: u16, register: u8, len: usize) -> Result<Vec<u8>, std::io::Error> {
        self.select(dev_addr)?;
        if len == 1 {
            return Ok(vec![read_byte(&mut self.i2c, register)?]);
        }
        let mut reg_data = vec![0u8; len];
        let bytes_read = self.i2c.i2c_read_block_data(register, &mut reg_data)?;
        debug!("Read {bytes_read} bytes from register {register:#x}");
        // -- a short read is handed on as is, the caller checks the length
        reg_data.truncate(bytes_read);
        Ok(reg_data)
    }
}
