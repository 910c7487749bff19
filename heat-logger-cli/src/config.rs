use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use heat_logger_core::models::error::InitError;
use heat_logger_core::LoggerConfiguration;

pub const DEFAULT_BASE_DIR: &str = "/home/user/heat_project";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("failed to install interrupt handler: {0}")]
    Signal(String),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("heat-logger drives Linux I2C and sysfs GPIO; this platform is not supported")]
    UnsupportedPlatform,
}

/// Temperature/humidity + GPS data logger.
#[derive(Debug, Default, Parser)]
#[command(name = "heat-logger", version, about)]
pub struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project directory; data/ and logs/ live under it unless overridden.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Seconds between the start of consecutive cycles.
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// How long the logging indicator stays lit each cycle.
    #[arg(long)]
    pub flash_dwell_ms: Option<u64>,

    #[arg(long)]
    pub file_prefix: Option<String>,

    #[arg(long)]
    pub i2c_bus: Option<PathBuf>,

    #[arg(long)]
    pub gpsd_host: Option<String>,

    #[arg(long)]
    pub gpsd_port: Option<u16>,

    /// Overrides `RUST_LOG` (e.g. `debug`, `heat_logger_linux=trace`).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinSettings {
    pub transducer_health: u64,
    pub fix_presence: u64,
    pub logging_activity: u64,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self {
            transducer_health: 16,
            fix_presence: 20,
            logging_activity: 21,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GpsdSettings {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for GpsdSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 2947,
            timeout_ms: 3000,
        }
    }
}

/// Resolved settings: TOML file (if any) with command-line flags on top.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub interval_secs: u64,
    pub flash_dwell_ms: u64,
    pub file_prefix: String,
    pub i2c_bus: PathBuf,
    pub sensor_address: u8,
    pub log_level: Option<String>,
    pub pins: PinSettings,
    pub gpsd: GpsdSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let core = LoggerConfiguration::default();
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            data_dir: None,
            log_dir: None,
            interval_secs: core.interval.as_secs(),
            flash_dwell_ms: core.flash_dwell.as_millis() as u64,
            file_prefix: core.file_prefix,
            i2c_bus: PathBuf::from("/dev/i2c-1"),
            sensor_address: 0x44,
            log_level: None,
            pins: PinSettings::default(),
            gpsd: GpsdSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&text).map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn resolve(args: &Args) -> Result<Self, CliError> {
        let mut settings = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply(args);
        Ok(settings)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(v) = &args.base_dir {
            self.base_dir = v.clone();
        }
        if let Some(v) = &args.data_dir {
            self.data_dir = Some(v.clone());
        }
        if let Some(v) = &args.log_dir {
            self.log_dir = Some(v.clone());
        }
        if let Some(v) = args.interval_secs {
            self.interval_secs = v;
        }
        if let Some(v) = args.flash_dwell_ms {
            self.flash_dwell_ms = v;
        }
        if let Some(v) = &args.file_prefix {
            self.file_prefix = v.clone();
        }
        if let Some(v) = &args.i2c_bus {
            self.i2c_bus = v.clone();
        }
        if let Some(v) = &args.gpsd_host {
            self.gpsd.host = v.clone();
        }
        if let Some(v) = args.gpsd_port {
            self.gpsd.port = v;
        }
        if let Some(v) = &args.log_level {
            self.log_level = Some(v.clone());
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("data"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("logs"))
    }

    pub fn gpsd_timeout(&self) -> Duration {
        Duration::from_millis(self.gpsd.timeout_ms)
    }

    /// The core loop's view of these settings, validated.
    pub fn logger_configuration(&self) -> Result<LoggerConfiguration, CliError> {
        let config = LoggerConfiguration {
            interval: Duration::from_secs(self.interval_secs),
            flash_dwell: Duration::from_millis(self.flash_dwell_ms),
            output_directory: self.data_dir(),
            file_prefix: self.file_prefix.clone(),
        };
        config.validate().map_err(CliError::Config)?;
        Ok(config)
    }
}
