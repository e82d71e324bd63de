use std::fmt;
use std::str::FromStr;

use crate::error::Bme280Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280DeviceAddress {
    Primary,
    Secondary,
}

impl Default for Bme280DeviceAddress {
    fn default() -> Self {
        Self::Primary
    }
}

impl Bme280DeviceAddress {
    const ADDR_PRIMARY: u16 = 0x76;
    const ADDR_SECONDARY: u16 = 0x77;

    pub fn value(&self) -> u16 {
        match *self {
            Self::Primary => Self::ADDR_PRIMARY,
            Self::Secondary => Self::ADDR_SECONDARY,
        }
    }
}

impl fmt::Display for Bme280DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Primary => write!(f, "Primary/{:#04x}", self.value()),
            Self::Secondary => write!(f, "Secondary/{:#04x}", self.value()),
        }
    }
}

impl FromStr for Bme280DeviceAddress {
    type Err = Bme280Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" | "0x76" => Ok(Self::Primary),
            "secondary" | "0x77" => Ok(Self::Secondary),
            _ => Err(Bme280Error::invalid_setting("device address", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280SensorMode {
    Sleep,
    Forced,
    Normal,
}

impl Bme280SensorMode {
    const POWERMODE_SLEEP: u8 = 0x00;
    const POWERMODE_FORCED: u8 = 0x01;
    const POWERMODE_NORMAL: u8 = 0x03;

    pub fn value(&self) -> u8 {
        match *self {
            Self::Sleep => Self::POWERMODE_SLEEP,
            Self::Forced => Self::POWERMODE_FORCED,
            Self::Normal => Self::POWERMODE_NORMAL,
        }
    }
}

impl fmt::Display for Bme280SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Sleep => write!(f, "Sleep/{:#04x}", self.value()),
            Self::Forced => write!(f, "Forced/{:#04x}", self.value()),
            Self::Normal => write!(f, "Normal/{:#04x}", self.value()),
        }
    }
}

// -- 01 and 10 both select forced mode
impl TryFrom<u8> for Bme280SensorMode {
    type Error = Bme280Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Sleep),
            1..=2 => Ok(Self::Forced),
            3 => Ok(Self::Normal),
            _ => Err(Bme280Error::invalid_setting("sensor mode", code)),
        }
    }
}

impl FromStr for Bme280SensorMode {
    type Err = Bme280Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sleep" => Ok(Self::Sleep),
            "forced" => Ok(Self::Forced),
            "normal" => Ok(Self::Normal),
            _ => Err(Bme280Error::invalid_setting("sensor mode", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280OverSampling {
    Skip,
    Oversampling1x,
    Oversampling2x,
    Oversampling4x,
    Oversampling8x,
    Oversampling16x,
}

impl Bme280OverSampling {
    const BME280_NO_OVERSAMPLING: u8 = 0x00;
    const BME280_OVERSAMPLING_1X: u8 = 0x01;
    const BME280_OVERSAMPLING_2X: u8 = 0x02;
    const BME280_OVERSAMPLING_4X: u8 = 0x03;
    const BME280_OVERSAMPLING_8X: u8 = 0x04;
    const BME280_OVERSAMPLING_16X: u8 = 0x05;

    pub fn value(&self) -> u8 {
        match *self {
            Self::Skip => Self::BME280_NO_OVERSAMPLING,
            Self::Oversampling1x => Self::BME280_OVERSAMPLING_1X,
            Self::Oversampling2x => Self::BME280_OVERSAMPLING_2X,
            Self::Oversampling4x => Self::BME280_OVERSAMPLING_4X,
            Self::Oversampling8x => Self::BME280_OVERSAMPLING_8X,
            Self::Oversampling16x => Self::BME280_OVERSAMPLING_16X,
        }
    }
}

impl fmt::Display for Bme280OverSampling {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Skip => write!(f, "Skip/{:#04x}", self.value()),
            Self::Oversampling1x => write!(f, "X1/{:#04x}", self.value()),
            Self::Oversampling2x => write!(f, "X2/{:#04x}", self.value()),
            Self::Oversampling4x => write!(f, "X4/{:#04x}", self.value()),
            Self::Oversampling8x => write!(f, "X8/{:#04x}", self.value()),
            Self::Oversampling16x => write!(f, "X16/{:#04x}", self.value()),
        }
    }
}

// -- 101 and all codes above select x16
impl TryFrom<u8> for Bme280OverSampling {
    type Error = Bme280Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Skip),
            1 => Ok(Self::Oversampling1x),
            2 => Ok(Self::Oversampling2x),
            3 => Ok(Self::Oversampling4x),
            4 => Ok(Self::Oversampling8x),
            5..=7 => Ok(Self::Oversampling16x),
            _ => Err(Bme280Error::invalid_setting("oversampling", code)),
        }
    }
}

impl FromStr for Bme280OverSampling {
    type Err = Bme280Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" | "0" => Ok(Self::Skip),
            "x1" | "1" => Ok(Self::Oversampling1x),
            "x2" | "2" => Ok(Self::Oversampling2x),
            "x4" | "4" => Ok(Self::Oversampling4x),
            "x8" | "8" => Ok(Self::Oversampling8x),
            "x16" | "16" => Ok(Self::Oversampling16x),
            _ => Err(Bme280Error::invalid_setting("oversampling", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280TimeStandby {
    Ms0_5,
    Ms10,
    Ms20,
    Ms62_5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
}

impl Bme280TimeStandby {
    const BME280_STANDBY_TIME_0_5_MS: u8 = 0x00;
    const BME280_STANDBY_TIME_62_5_MS: u8 = 0x01;
    const BME280_STANDBY_TIME_125_MS: u8 = 0x02;
    const BME280_STANDBY_TIME_250_MS: u8 = 0x03;
    const BME280_STANDBY_TIME_500_MS: u8 = 0x04;
    const BME280_STANDBY_TIME_1000_MS: u8 = 0x05;
    const BME280_STANDBY_TIME_10_MS: u8 = 0x06;
    const BME280_STANDBY_TIME_20_MS: u8 = 0x07;

    pub fn value(&self) -> u8 {
        match *self {
            Self::Ms0_5 => Self::BME280_STANDBY_TIME_0_5_MS,
            Self::Ms10 => Self::BME280_STANDBY_TIME_10_MS,
            Self::Ms20 => Self::BME280_STANDBY_TIME_20_MS,
            Self::Ms62_5 => Self::BME280_STANDBY_TIME_62_5_MS,
            Self::Ms125 => Self::BME280_STANDBY_TIME_125_MS,
            Self::Ms250 => Self::BME280_STANDBY_TIME_250_MS,
            Self::Ms500 => Self::BME280_STANDBY_TIME_500_MS,
            Self::Ms1000 => Self::BME280_STANDBY_TIME_1000_MS,
        }
    }

    /// Inactive duration between two conversions in normal mode, in microseconds.
    pub fn micros(&self) -> u32 {
        match *self {
            Self::Ms0_5 => 500,
            Self::Ms10 => 10_000,
            Self::Ms20 => 20_000,
            Self::Ms62_5 => 62_500,
            Self::Ms125 => 125_000,
            Self::Ms250 => 250_000,
            Self::Ms500 => 500_000,
            Self::Ms1000 => 1_000_000,
        }
    }
}

impl fmt::Display for Bme280TimeStandby {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Ms0_5 => write!(f, "0.5ms/{:#04x}", self.value()),
            Self::Ms10 => write!(f, "10ms/{:#04x}", self.value()),
            Self::Ms20 => write!(f, "20ms/{:#04x}", self.value()),
            Self::Ms62_5 => write!(f, "62.5ms/{:#04x}", self.value()),
            Self::Ms125 => write!(f, "125ms/{:#04x}", self.value()),
            Self::Ms250 => write!(f, "250ms/{:#04x}", self.value()),
            Self::Ms500 => write!(f, "500ms/{:#04x}", self.value()),
            Self::Ms1000 => write!(f, "1000ms/{:#04x}", self.value()),
        }
    }
}

impl TryFrom<u8> for Bme280TimeStandby {
    type Error = Bme280Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Ms0_5),
            1 => Ok(Self::Ms62_5),
            2 => Ok(Self::Ms125),
            3 => Ok(Self::Ms250),
            4 => Ok(Self::Ms500),
            5 => Ok(Self::Ms1000),
            6 => Ok(Self::Ms10),
            7 => Ok(Self::Ms20),
            _ => Err(Bme280Error::invalid_setting("standby time", code)),
        }
    }
}

impl FromStr for Bme280TimeStandby {
    type Err = Bme280Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches("ms") {
            "0.5" | "0_5" => Ok(Self::Ms0_5),
            "10" => Ok(Self::Ms10),
            "20" => Ok(Self::Ms20),
            "62.5" | "62_5" => Ok(Self::Ms62_5),
            "125" => Ok(Self::Ms125),
            "250" => Ok(Self::Ms250),
            "500" => Ok(Self::Ms500),
            "1000" => Ok(Self::Ms1000),
            _ => Err(Bme280Error::invalid_setting("standby time", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280IrrFilter {
    FilterOff,
    Filter2x,
    Filter4x,
    Filter8x,
    Filter16x,
}

impl Bme280IrrFilter {
    const BME280_FILTER_COEFF_OFF: u8 = 0x00;
    const BME280_FILTER_COEFF_2: u8 = 0x01;
    const BME280_FILTER_COEFF_4: u8 = 0x02;
    const BME280_FILTER_COEFF_8: u8 = 0x03;
    const BME280_FILTER_COEFF_16: u8 = 0x04;

    pub fn value(&self) -> u8 {
        match *self {
            Self::FilterOff => Self::BME280_FILTER_COEFF_OFF,
            Self::Filter2x => Self::BME280_FILTER_COEFF_2,
            Self::Filter4x => Self::BME280_FILTER_COEFF_4,
            Self::Filter8x => Self::BME280_FILTER_COEFF_8,
            Self::Filter16x => Self::BME280_FILTER_COEFF_16,
        }
    }
}

impl fmt::Display for Bme280IrrFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::FilterOff => write!(f, "Off/{:#04x}", self.value()),
            Self::Filter2x => write!(f, "Coef2/{:#04x}", self.value()),
            Self::Filter4x => write!(f, "Coef4/{:#04x}", self.value()),
            Self::Filter8x => write!(f, "Coef8/{:#04x}", self.value()),
            Self::Filter16x => write!(f, "Coef16/{:#04x}", self.value()),
        }
    }
}

// -- 100 and all codes above select coefficient 16
impl TryFrom<u8> for Bme280IrrFilter {
    type Error = Bme280Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::FilterOff),
            1 => Ok(Self::Filter2x),
            2 => Ok(Self::Filter4x),
            3 => Ok(Self::Filter8x),
            4..=7 => Ok(Self::Filter16x),
            _ => Err(Bme280Error::invalid_setting("filter coefficient", code)),
        }
    }
}

impl FromStr for Bme280IrrFilter {
    type Err = Bme280Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(Self::FilterOff),
            "2" => Ok(Self::Filter2x),
            "4" => Ok(Self::Filter4x),
            "8" => Ok(Self::Filter8x),
            "16" => Ok(Self::Filter16x),
            _ => Err(Bme280Error::invalid_setting("filter coefficient", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280Spi3w {
    Disable,
    Enable,
}

impl Bme280Spi3w {
    const BME280_SPI3W_DISABLE: u8 = 0x00;
    const BME280_SPI3W_ENABLE: u8 = 0x01;

    pub fn value(&self) -> u8 {
        match *self {
            Self::Disable => Self::BME280_SPI3W_DISABLE,
            Self::Enable => Self::BME280_SPI3W_ENABLE,
        }
    }
}

impl fmt::Display for Bme280Spi3w {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Disable => write!(f, "Disable/{}", self.value()),
            Self::Enable => write!(f, "Enable/{}", self.value()),
        }
    }
}

impl TryFrom<u8> for Bme280Spi3w {
    type Error = Bme280Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Disable),
            1 => Ok(Self::Enable),
            _ => Err(Bme280Error::invalid_setting("spi3w", code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standby_codes_are_total() {
        let mut seen = [false; 8];
        for code in 0..8u8 {
            let standby = Bme280TimeStandby::try_from(code).unwrap();
            assert_eq!(code, standby.value());
            seen[code as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(Bme280TimeStandby::Ms10.value(), 0b110);
        assert_eq!(Bme280TimeStandby::Ms20.value(), 0b111);
    }

    #[test]
    fn oversampling_codes_match_datasheet() {
        assert_eq!(Bme280OverSampling::Skip.value(), 0b000);
        assert_eq!(Bme280OverSampling::Oversampling1x.value(), 0b001);
        assert_eq!(Bme280OverSampling::Oversampling2x.value(), 0b010);
        assert_eq!(Bme280OverSampling::Oversampling4x.value(), 0b011);
        assert_eq!(Bme280OverSampling::Oversampling8x.value(), 0b100);
        assert_eq!(Bme280OverSampling::Oversampling16x.value(), 0b101);
    }

    #[test]
    fn reserved_codes_decode_to_highest_setting() {
        assert_eq!(Bme280OverSampling::try_from(0b110).unwrap(), Bme280OverSampling::Oversampling16x);
        assert_eq!(Bme280OverSampling::try_from(0b111).unwrap(), Bme280OverSampling::Oversampling16x);
        assert_eq!(Bme280IrrFilter::try_from(0b101).unwrap(), Bme280IrrFilter::Filter16x);
        assert_eq!(Bme280SensorMode::try_from(0b10).unwrap(), Bme280SensorMode::Forced);
    }

    #[test]
    fn codes_wider_than_field_are_rejected() {
        assert!(matches!(Bme280OverSampling::try_from(8), Err(Bme280Error::InvalidSetting { .. })));
        assert!(matches!(Bme280SensorMode::try_from(4), Err(Bme280Error::InvalidSetting { .. })));
        assert!(matches!(Bme280TimeStandby::try_from(0xff), Err(Bme280Error::InvalidSetting { .. })));
        assert!(matches!(Bme280IrrFilter::try_from(8), Err(Bme280Error::InvalidSetting { .. })));
        assert!(matches!(Bme280Spi3w::try_from(2), Err(Bme280Error::InvalidSetting { .. })));
    }

    #[test]
    fn parse_names() {
        assert_eq!("x16".parse::<Bme280OverSampling>().unwrap(), Bme280OverSampling::Oversampling16x);
        assert_eq!("62.5ms".parse::<Bme280TimeStandby>().unwrap(), Bme280TimeStandby::Ms62_5);
        assert_eq!("off".parse::<Bme280IrrFilter>().unwrap(), Bme280IrrFilter::FilterOff);
        assert_eq!("Forced".parse::<Bme280SensorMode>().unwrap(), Bme280SensorMode::Forced);
        assert_eq!("0x77".parse::<Bme280DeviceAddress>().unwrap(), Bme280DeviceAddress::Secondary);
        assert!("x32".parse::<Bme280OverSampling>().is_err());
        assert!("3".parse::<Bme280IrrFilter>().is_err());
    }
}
