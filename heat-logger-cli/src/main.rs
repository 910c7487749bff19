//! `heat-logger`: samples an SHT4x/SHT3x transducer and gpsd on a fixed
//! cadence and appends one CSV row per cycle until interrupted.

mod config;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use config::{Args, CliError, Settings};

fn main() -> ExitCode {
    let args = Args::parse();

    match Settings::resolve(&args).and_then(|settings| run(&settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("{}", e);
            } else {
                eprintln!("heat-logger: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "linux")]
fn run(settings: &Settings) -> Result<(), CliError> {
    use heat_logger_core::models::error::InitError;
    use heat_logger_core::{AcquisitionLoop, SystemClock};
    use heat_logger_linux::{
        close_sysfs_indicators, open_sysfs_indicators, GpsdClient, I2cdevOpener, IndicatorPins,
        ShtProber,
    };

    let log_path = logging::init(
        &settings.log_dir(),
        chrono::Local::now(),
        settings.log_level.as_deref(),
    )?;
    log::info!("Starting datalogger, operational log at {}", log_path.display());

    let config = settings.logger_configuration()?;

    let pins = IndicatorPins {
        transducer_health: settings.pins.transducer_health,
        fix_presence: settings.pins.fix_presence,
        logging_activity: settings.pins.logging_activity,
    };
    let indicators =
        open_sysfs_indicators(pins).map_err(|e| InitError::IndicatorSetup(e.to_string()))?;
    let prober = ShtProber::with_address(
        I2cdevOpener::new(&settings.i2c_bus),
        settings.sensor_address,
    );
    let gpsd = GpsdClient::new(settings.gpsd.host.clone(), settings.gpsd.port)
        .with_timeout(settings.gpsd_timeout());

    let mut logger = AcquisitionLoop::new(prober, gpsd, indicators, SystemClock::new(), config);
    let stop = logger.stop_signal();
    ctrlc::set_handler(move || stop.request_stop())
        .map_err(|e| CliError::Signal(e.to_string()))?;

    let result = logger.run();
    close_sysfs_indicators(logger.into_indicator_driver());

    let diagnostics = result?;
    log::info!(
        "Cycles: {}, rows written: {}, write failures: {}, transducer read errors: {}, fix query errors: {}",
        diagnostics.cycles_completed,
        diagnostics.rows_written,
        diagnostics.write_failures,
        diagnostics.transducer_read_errors,
        diagnostics.fix_query_errors,
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(_settings: &Settings) -> Result<(), CliError> {
    Err(CliError::UnsupportedPlatform)
}
