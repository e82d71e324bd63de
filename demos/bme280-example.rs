use chrono::Local;
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use std::path::Path;
use std::process::ExitCode;
use std::{thread, time};

use bme280_i2c::bme280::*;
use bme280_i2c::error::Bme280Error;
use bme280_i2c::i2cio::LinuxI2cBus;

const EXIT_CODE_SET_CTR_C_HNDLR_FAILED: u8 = 0x02;
const EXIT_CODE_INVALID_SETTING: u8 = 0x03;
const EXIT_CODE_OPEN_BUS_FAILED: u8 = 0x04;
const EXIT_CODE_BME280_INIT_FAILED: u8 = 0x51;
const EXIT_CODE_BME280_APPLY_SETTINGS_FAILED: u8 = 0x52;
const EXIT_CODE_BME280_MEASURE_FORCED_FAILED: u8 = 0x53;
const EXIT_CODE_BME280_GET_MEASUREMENT_FAILED: u8 = 0x54;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum AcquisitionMode {
    Forced,
    Normal,
}

#[derive(Parser)]
struct Args {
    // -- i2c bus device
    bus_path: String,
    #[clap(value_enum)]
    mode: AcquisitionMode,
    // -- device address, primary (0x76) or secondary (0x77)
    #[clap(long, env = "BME280_ADDRESS", default_value = "primary")]
    address: String,
    #[clap(long = "osr-t", env = "BME280_OSR_T", default_value = "x1")]
    osr_t: String,
    #[clap(long = "osr-p", env = "BME280_OSR_P", default_value = "x1")]
    osr_p: String,
    #[clap(long = "osr-h", env = "BME280_OSR_H", default_value = "x1")]
    osr_h: String,
    #[clap(long, env = "BME280_FILTER", default_value = "off")]
    filter: String,
    // -- standby time in normal mode, in ms
    #[clap(long, env = "BME280_STANDBY", default_value = "1000")]
    standby: String,
    #[clap(long = "interval-ms", env = "BME280_INTERVAL_MS", default_value_t = 2000)]
    interval_ms: u64,
    // -- number of readings, endless if not given
    #[clap(long)]
    count: Option<u64>,
}

fn get_sensor_settings(args: &Args) -> Result<ControlRegisters, Bme280Error> {
    let mut settings = ControlRegisters::new();
    settings.set_osr_temperature(args.osr_t.parse()?)?;
    settings.set_osr_pressure(args.osr_p.parse()?)?;
    settings.set_osr_humidity(args.osr_h.parse()?)?;
    settings.set_irr_filter(args.filter.parse()?)?;
    settings.set_time_standby(args.standby.parse()?)?;
    let sensor_mode = match args.mode {
        AcquisitionMode::Forced => Bme280SensorMode::Sleep,
        AcquisitionMode::Normal => Bme280SensorMode::Normal,
    };
    settings.set_sensor_mode(sensor_mode)?;
    Ok(settings)
}

fn log_measurement(measurement: &Bme280Measurement) {
    let temperature = match measurement.temperature_celsius() {
        Some(temperature) => format!("{temperature:.2} °C"),
        None => "<no data>".to_string(),
    };
    let pressure = match measurement.pressure_hpa() {
        Some(pressure) => format!("{pressure:.2} hPa"),
        None => "<no data>".to_string(),
    };
    let humidity = match measurement.humidity_percent() {
        Some(humidity) => format!("{humidity:.2} %RH"),
        None => "<no data>".to_string(),
    };
    info!("temperature: {temperature}, pressure: {pressure}, humidity: {humidity}");
}

fn main() -> ExitCode {

    // -- read .env file
    dotenv::dotenv().ok();
    // -- setup logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let now = Local::now();
    info!("Starting up: {now}");

    let args = Args::parse();
    info!("Using i2c bus device {}", args.bus_path);

    let dev_addr: Bme280DeviceAddress = match args.address.parse() {
        Ok(dev_addr) => dev_addr,
        Err(err) => {
            error!("ERROR - {err}");
            return ExitCode::from(EXIT_CODE_INVALID_SETTING);
        }
    };
    let settings = match get_sensor_settings(&args) {
        Ok(settings) => settings,
        Err(err) => {
            error!("ERROR - {err}");
            return ExitCode::from(EXIT_CODE_INVALID_SETTING);
        }
    };

    // -- set handler for Ctrl-C
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, terminating...");
        std::process::exit(0);
    }) {
        error!("ERROR - Failed to set Ctrl-C handler: {err}");
        return ExitCode::from(EXIT_CODE_SET_CTR_C_HNDLR_FAILED);
    }

    let bus = match LinuxI2cBus::new(Path::new(&args.bus_path)) {
        Ok(bus) => bus,
        Err(err) => {
            error!("ERROR - Failed to open i2c bus {}: {err}", args.bus_path);
            return ExitCode::from(EXIT_CODE_OPEN_BUS_FAILED);
        }
    };

    info!("Initializing BME280 at {dev_addr}");
    let mut bme280 = match BME280::new(bus, dev_addr) {
        Ok(bme280) => bme280,
        Err(err) => {
            error!("ERROR - Failed to initialize BME280: {err}");
            return ExitCode::from(EXIT_CODE_BME280_INIT_FAILED);
        }
    };
    if let Err(err) = bme280.apply_settings(&settings) {
        error!("ERROR - Failed to apply BME280 settings: {err}");
        return ExitCode::from(EXIT_CODE_BME280_APPLY_SETTINGS_FAILED);
    }
    info!("Settings: config {:#010b}, ctrl_hum {:#010b}, ctrl_meas {:#010b}",
        settings.config(), settings.ctrl_hum(), settings.ctrl_meas());
    if args.mode == AcquisitionMode::Normal {
        if let Ok(t_standby) = settings.time_standby() {
            if args.interval_ms < u64::from(t_standby.micros()) / 1000 {
                warn!("Reading interval is shorter than the standby time {t_standby}");
            }
        }
    }

    let mut readings = 0u64;
    loop {
        let measurement = match args.mode {
            AcquisitionMode::Forced => match bme280.measure_forced() {
                Ok(measurement) => measurement,
                Err(err) => {
                    error!("ERROR - Failed to get forced measurement from BME280: {err}");
                    return ExitCode::from(EXIT_CODE_BME280_MEASURE_FORCED_FAILED);
                }
            },
            AcquisitionMode::Normal => match bme280.get_measurement() {
                Ok(measurement) => measurement,
                Err(err) => {
                    error!("ERROR - Failed to get measurement from BME280: {err}");
                    return ExitCode::from(EXIT_CODE_BME280_GET_MEASUREMENT_FAILED);
                }
            },
        };
        log_measurement(&measurement);
        readings += 1;
        if args.count.is_some_and(|count| readings >= count) {
            info!("Done after {readings} readings");
            return ExitCode::SUCCESS;
        }
        // -- delay next reading
        let data_acquisition_delay = time::Duration::from_millis(args.interval_ms);
        thread::sleep(data_acquisition_delay);
    }
}
