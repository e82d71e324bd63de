use log::debug;

use crate::error::Bme280Error;

use super::bme280_enums::*;

// -- chip id and commands
pub const BME280_CHIP_ID: u8 = 0x60;
pub const BME280_SOFT_RESET_COMMAND: u8 = 0xb6;

// -- registers
pub const BME280_REG_TEMP_CALIB_DATA: u8 = 0x88;
pub const BME280_REG_PRESS_CALIB_DATA: u8 = 0x8e;
pub const BME280_REG_HUMIDITY_CALIB_DATA_1: u8 = 0xa1;
pub const BME280_REG_PART_ID: u8 = 0xd0;
pub const BME280_REG_RESET: u8 = 0xe0;
pub const BME280_REG_HUMIDITY_CALIB_DATA_2: u8 = 0xe1;
pub const BME280_REG_CTRL_HUM: u8 = 0xf2;
pub const BME280_REG_STATUS: u8 = 0xf3;
pub const BME280_REG_CTRL_MEAS: u8 = 0xf4;
pub const BME280_REG_CONFIG: u8 = 0xf5;
pub const BME280_REG_PRESS_DATA: u8 = 0xf7;
pub const BME280_REG_TEMP_DATA: u8 = 0xfa;
pub const BME280_REG_HUMIDITY_DATA: u8 = 0xfd;

// -- length of multi-byte registers
pub const BME280_LEN_TEMP_CALIB_DATA: usize = 6;
pub const BME280_LEN_PRESS_CALIB_DATA: usize = 18;
pub const BME280_LEN_HUMIDITY_CALIB_DATA_1: usize = 1;
pub const BME280_LEN_HUMIDITY_CALIB_DATA_2: usize = 7;
pub const BME280_LEN_PRESS_DATA: usize = 3;
pub const BME280_LEN_TEMP_DATA: usize = 3;
pub const BME280_LEN_HUMIDITY_DATA: usize = 2;
pub const BME280_LEN_P_T_H_DATA: usize = 8;

// -- masks for status
pub const BME280_STATUS_MEASURING: u8 = 0x08;
pub const BME280_STATUS_IM_UPDATE: u8 = 0x01;

/// The three writable control registers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280ControlRegister {
    CtrlHum,
    CtrlMeas,
    Config,
}

impl Bme280ControlRegister {
    pub fn address(&self) -> u8 {
        match *self {
            Self::CtrlHum => BME280_REG_CTRL_HUM,
            Self::CtrlMeas => BME280_REG_CTRL_MEAS,
            Self::Config => BME280_REG_CONFIG,
        }
    }
}

/// Position of a bitfield inside its control register.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldLayout {
    pub register: Bme280ControlRegister,
    pub offset: u8,
    pub width: u8,
}

impl FieldLayout {
    /// Field value mask, not shifted.
    pub fn max_code(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Mask covering the field at its position in the register.
    pub fn mask(&self) -> u8 {
        self.max_code() << self.offset
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bme280Field {
    OsrHumidity,
    SensorMode,
    OsrPressure,
    OsrTemperature,
    Spi3w,
    IrrFilter,
    TimeStandby,
}

impl Bme280Field {
    pub const ALL: [Bme280Field; 7] = [
        Self::OsrHumidity, Self::SensorMode, Self::OsrPressure, Self::OsrTemperature,
        Self::Spi3w, Self::IrrFilter, Self::TimeStandby,
    ];

    pub fn layout(&self) -> FieldLayout {
        use Bme280ControlRegister::*;
        let (register, offset, width) = match *self {
            Self::OsrHumidity => (CtrlHum, 0, 3),
            Self::SensorMode => (CtrlMeas, 0, 2),
            Self::OsrPressure => (CtrlMeas, 2, 3),
            Self::OsrTemperature => (CtrlMeas, 5, 3),
            Self::Spi3w => (Config, 0, 1),
            Self::IrrFilter => (Config, 2, 3),
            Self::TimeStandby => (Config, 5, 3),
        };
        FieldLayout { register, offset, width }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Self::OsrHumidity => "osrs_h",
            Self::SensorMode => "mode",
            Self::OsrPressure => "osrs_p",
            Self::OsrTemperature => "osrs_t",
            Self::Spi3w => "spi3w_en",
            Self::IrrFilter => "filter",
            Self::TimeStandby => "t_sb",
        }
    }
}

/// In-memory image of ctrl_hum, ctrl_meas and config.
///
/// Every mutator only touches the bits of its own field. The model never talks
/// to the bus; `to_bytes` hands the bytes over in the order they have to be
/// written.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlRegisters {
    ctrl_hum: u8,
    ctrl_meas: u8,
    config: u8,
}

impl ControlRegisters {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds the model from bytes in `to_bytes` order.
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        ControlRegisters { config: bytes[0], ctrl_hum: bytes[1], ctrl_meas: bytes[2] }
    }

    fn register(&self, register: Bme280ControlRegister) -> u8 {
        match register {
            Bme280ControlRegister::CtrlHum => self.ctrl_hum,
            Bme280ControlRegister::CtrlMeas => self.ctrl_meas,
            Bme280ControlRegister::Config => self.config,
        }
    }

    fn register_mut(&mut self, register: Bme280ControlRegister) -> &mut u8 {
        match register {
            Bme280ControlRegister::CtrlHum => &mut self.ctrl_hum,
            Bme280ControlRegister::CtrlMeas => &mut self.ctrl_meas,
            Bme280ControlRegister::Config => &mut self.config,
        }
    }

    pub fn set_field(&mut self, field: Bme280Field, code: u8) -> Result<(), Bme280Error> {
        let layout = field.layout();
        if code > layout.max_code() {
            return Err(Bme280Error::invalid_setting(field.name(), format!("{code:#04x}")));
        }
        let reg_val = self.register_mut(layout.register);
        // -- clear the field bits, keep all others, then set the new code
        *reg_val = (*reg_val & !layout.mask()) | (code << layout.offset);
        debug!("Set field {} to {code:#05b}, register {:#x} now {:#010b}",
            field.name(), layout.register.address(), *reg_val);
        Ok(())
    }

    pub fn field(&self, field: Bme280Field) -> u8 {
        let layout = field.layout();
        (self.register(layout.register) & layout.mask()) >> layout.offset
    }

    pub fn set_osr_humidity(&mut self, osr_h: Bme280OverSampling) -> Result<(), Bme280Error> {
        self.set_field(Bme280Field::OsrHumidity, osr_h.value())
    }

    pub fn set_osr_temperature(&mut self, osr_t: Bme280OverSampling) -> Result<(), Bme280Error> {
        self.set_field(Bme280Field::OsrTemperature, osr_t.value())
    }

    pub fn set_osr_pressure(&mut self, osr_p: Bme280OverSampling) -> Result<(), Bme280Error> {
        self.set_field(Bme280Field::OsrPressure, osr_p.value())
    }

    pub fn set_sensor_mode(&mut self, sensor_mode: Bme280SensorMode) -> Result<(), Bme280Error> {
        self.set_field(Bme280Field::SensorMode, sensor_mode.value())
    }

    pub fn set_time_standby(&mut self, t_standby: Bme280TimeStandby) -> Result<(), Bme280Error> {
        self.set_field(Bme280Field::TimeStandby, t_standby.value())
    }

    pub fn set_irr_filter(&mut self, irr_filter: Bme280IrrFilter) -> Result<(), Bme280Error> {
        self.set_field(Bme280Field::IrrFilter, irr_filter.value())
    }

    pub fn set_spi3w(&mut self, spi3w_en: Bme280Spi3w) -> Result<(), Bme280Error> {
        self.set_field(Bme280Field::Spi3w, spi3w_en.value())
    }

    pub fn osr_humidity(&self) -> Result<Bme280OverSampling, Bme280Error> {
        Bme280OverSampling::try_from(self.field(Bme280Field::OsrHumidity))
    }

    pub fn osr_temperature(&self) -> Result<Bme280OverSampling, Bme280Error> {
        Bme280OverSampling::try_from(self.field(Bme280Field::OsrTemperature))
    }

    pub fn osr_pressure(&self) -> Result<Bme280OverSampling, Bme280Error> {
        Bme280OverSampling::try_from(self.field(Bme280Field::OsrPressure))
    }

    pub fn sensor_mode(&self) -> Result<Bme280SensorMode, Bme280Error> {
        Bme280SensorMode::try_from(self.field(Bme280Field::SensorMode))
    }

    pub fn time_standby(&self) -> Result<Bme280TimeStandby, Bme280Error> {
        Bme280TimeStandby::try_from(self.field(Bme280Field::TimeStandby))
    }

    pub fn irr_filter(&self) -> Result<Bme280IrrFilter, Bme280Error> {
        Bme280IrrFilter::try_from(self.field(Bme280Field::IrrFilter))
    }

    pub fn spi3w(&self) -> Result<Bme280Spi3w, Bme280Error> {
        Bme280Spi3w::try_from(self.field(Bme280Field::Spi3w))
    }

    pub fn ctrl_hum(&self) -> u8 {
        self.ctrl_hum
    }

    pub fn ctrl_meas(&self) -> u8 {
        self.ctrl_meas
    }

    pub fn config(&self) -> u8 {
        self.config
    }

    /// Returns config, ctrl_hum, ctrl_meas. A change of ctrl_hum only becomes
    /// effective after the following write to ctrl_meas.
    pub fn to_bytes(&self) -> [u8; 3] {
        [self.config, self.ctrl_hum, self.ctrl_meas]
    }

    /// Register address and value pairs in write order.
    pub fn register_writes(&self) -> [(u8, u8); 3] {
        [
            (BME280_REG_CONFIG, self.config),
            (BME280_REG_CTRL_HUM, self.ctrl_hum),
            (BME280_REG_CTRL_MEAS, self.ctrl_meas),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OSR_ALL: [Bme280OverSampling; 6] = [
        Bme280OverSampling::Skip, Bme280OverSampling::Oversampling1x,
        Bme280OverSampling::Oversampling2x, Bme280OverSampling::Oversampling4x,
        Bme280OverSampling::Oversampling8x, Bme280OverSampling::Oversampling16x,
    ];

    const STANDBY_ALL: [Bme280TimeStandby; 8] = [
        Bme280TimeStandby::Ms0_5, Bme280TimeStandby::Ms10, Bme280TimeStandby::Ms20,
        Bme280TimeStandby::Ms62_5, Bme280TimeStandby::Ms125, Bme280TimeStandby::Ms250,
        Bme280TimeStandby::Ms500, Bme280TimeStandby::Ms1000,
    ];

    const FILTER_ALL: [Bme280IrrFilter; 5] = [
        Bme280IrrFilter::FilterOff, Bme280IrrFilter::Filter2x, Bme280IrrFilter::Filter4x,
        Bme280IrrFilter::Filter8x, Bme280IrrFilter::Filter16x,
    ];

    const MODE_ALL: [Bme280SensorMode; 3] = [
        Bme280SensorMode::Sleep, Bme280SensorMode::Forced, Bme280SensorMode::Normal,
    ];

    #[test]
    fn layout_masks_match_datasheet() {
        assert_eq!(Bme280Field::OsrHumidity.layout().mask(), 0x07);
        assert_eq!(Bme280Field::SensorMode.layout().mask(), 0x03);
        assert_eq!(Bme280Field::OsrPressure.layout().mask(), 0x1c);
        assert_eq!(Bme280Field::OsrTemperature.layout().mask(), 0xe0);
        assert_eq!(Bme280Field::Spi3w.layout().mask(), 0x01);
        assert_eq!(Bme280Field::IrrFilter.layout().mask(), 0x1c);
        assert_eq!(Bme280Field::TimeStandby.layout().mask(), 0xe0);
    }

    #[test]
    fn fields_of_one_register_do_not_overlap() {
        for a in Bme280Field::ALL {
            for b in Bme280Field::ALL {
                let (la, lb) = (a.layout(), b.layout());
                if a != b && la.register == lb.register {
                    assert_eq!(la.mask() & lb.mask(), 0, "{} overlaps {}", a.name(), b.name());
                }
            }
        }
    }

    #[test]
    fn ctrl_meas_fields_are_independent() {
        for osr_t in OSR_ALL {
            for osr_p in OSR_ALL {
                for mode in MODE_ALL {
                    let mut regs = ControlRegisters::new();
                    regs.set_osr_temperature(osr_t).unwrap();
                    regs.set_sensor_mode(mode).unwrap();
                    regs.set_osr_pressure(osr_p).unwrap();
                    let expected = osr_t.value() << 5 | osr_p.value() << 2 | mode.value();
                    assert_eq!(regs.ctrl_meas(), expected);
                    assert_eq!(regs.osr_temperature().unwrap(), osr_t);
                    assert_eq!(regs.osr_pressure().unwrap(), osr_p);
                    assert_eq!(regs.sensor_mode().unwrap(), mode);
                }
            }
        }
    }

    #[test]
    fn config_fields_are_independent() {
        for t_sb in STANDBY_ALL {
            for filter in FILTER_ALL {
                let mut regs = ControlRegisters::new();
                regs.set_spi3w(Bme280Spi3w::Enable).unwrap();
                regs.set_time_standby(t_sb).unwrap();
                regs.set_irr_filter(filter).unwrap();
                assert_eq!(regs.config(), t_sb.value() << 5 | filter.value() << 2 | 0x01);
                assert_eq!(regs.time_standby().unwrap(), t_sb);
                assert_eq!(regs.irr_filter().unwrap(), filter);
                assert_eq!(regs.spi3w().unwrap(), Bme280Spi3w::Enable);
            }
        }
    }

    #[test]
    fn setting_field_preserves_foreign_bits() {
        // -- reserved bits of ctrl_hum set as well
        let mut regs = ControlRegisters::from_bytes([0xff, 0xff, 0xff]);
        regs.set_osr_humidity(Bme280OverSampling::Skip).unwrap();
        assert_eq!(regs.ctrl_hum(), 0xf8);
        regs.set_sensor_mode(Bme280SensorMode::Sleep).unwrap();
        assert_eq!(regs.ctrl_meas(), 0xfc);
        regs.set_osr_pressure(Bme280OverSampling::Oversampling1x).unwrap();
        assert_eq!(regs.ctrl_meas(), 0b1110_0100);
        regs.set_irr_filter(Bme280IrrFilter::FilterOff).unwrap();
        assert_eq!(regs.config(), 0xe3);
        regs.set_time_standby(Bme280TimeStandby::Ms0_5).unwrap();
        assert_eq!(regs.config(), 0x03);
    }

    #[test]
    fn overwriting_field_replaces_previous_code() {
        let mut regs = ControlRegisters::new();
        regs.set_osr_temperature(Bme280OverSampling::Oversampling16x).unwrap();
        regs.set_osr_temperature(Bme280OverSampling::Oversampling2x).unwrap();
        assert_eq!(regs.ctrl_meas(), 0b0100_0000);
        regs.set_sensor_mode(Bme280SensorMode::Normal).unwrap();
        regs.set_sensor_mode(Bme280SensorMode::Forced).unwrap();
        assert_eq!(regs.ctrl_meas(), 0b0100_0001);
    }

    #[test]
    fn out_of_range_code_is_rejected() {
        let mut regs = ControlRegisters::new();
        regs.set_osr_pressure(Bme280OverSampling::Oversampling4x).unwrap();
        let before = regs;
        let result = regs.set_field(Bme280Field::SensorMode, 0b100);
        assert!(matches!(result, Err(Bme280Error::InvalidSetting { field: "mode", .. })));
        assert!(regs.set_field(Bme280Field::Spi3w, 2).is_err());
        assert!(regs.set_field(Bme280Field::OsrTemperature, 8).is_err());
        assert_eq!(regs, before);
    }

    #[test]
    fn serialization_order_and_defaults() {
        let regs = ControlRegisters::new();
        assert_eq!(regs.to_bytes(), [0, 0, 0]);

        let mut regs = ControlRegisters::new();
        regs.set_osr_humidity(Bme280OverSampling::Oversampling1x).unwrap();
        assert_eq!(regs.to_bytes(), [0x00, 0x01, 0x00]);

        let mut regs = ControlRegisters::new();
        regs.set_irr_filter(Bme280IrrFilter::Filter4x).unwrap();
        regs.set_osr_humidity(Bme280OverSampling::Oversampling2x).unwrap();
        regs.set_osr_temperature(Bme280OverSampling::Oversampling1x).unwrap();
        regs.set_sensor_mode(Bme280SensorMode::Forced).unwrap();
        assert_eq!(regs.to_bytes(), [0b0000_1000, 0b0000_0010, 0b0010_0001]);
        assert_eq!(regs.register_writes(), [(0xf5, 0b0000_1000), (0xf2, 0b0000_0010), (0xf4, 0b0010_0001)]);
        assert_eq!(ControlRegisters::from_bytes(regs.to_bytes()), regs);
    }
}
