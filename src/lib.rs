pub mod bme280;
pub mod error;
pub mod i2cio;

#[cfg(test)]
mod testing;
