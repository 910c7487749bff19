//! # heat-logger-linux
//!
//! Linux hardware backends for heat-logger.
//!
//! Provides:
//! - `ShtProber`: Sensirion SHT4x / SHT3x discovery and measurement over any
//!   `embedded-hal` I2C bus
//! - `GpsdClient`: gpsd JSON client implementing `FixService`
//! - `PinIndicators`: three `embedded-hal` output pins as status indicators
//! - `I2cdevOpener`, `open_sysfs_indicators`: the `/dev/i2c-N` and sysfs
//!   GPIO bindings (Linux only)
//!
//! ## Usage
//! ```ignore
//! use heat_logger_linux::{open_sysfs_indicators, GpsdClient, I2cdevOpener, IndicatorPins, ShtProber};
//! use heat_logger_core::{AcquisitionLoop, LoggerConfiguration, SystemClock};
//!
//! let prober = ShtProber::new(I2cdevOpener::default());
//! let indicators = open_sysfs_indicators(IndicatorPins::default()).unwrap();
//! let mut logger = AcquisitionLoop::new(
//!     prober,
//!     GpsdClient::default(),
//!     indicators,
//!     SystemClock::new(),
//!     LoggerConfiguration::default(),
//! );
//! logger.run().unwrap();
//! ```

pub mod gpsd;
pub mod indicators;
pub mod sensirion;

#[cfg(target_os = "linux")]
pub mod i2cdev;
#[cfg(target_os = "linux")]
pub mod sysfs_gpio;

pub use gpsd::GpsdClient;
pub use indicators::PinIndicators;
pub use sensirion::{BusOpener, ShtDevice, ShtError, ShtProber};

#[cfg(target_os = "linux")]
pub use i2cdev::I2cdevOpener;
#[cfg(target_os = "linux")]
pub use sysfs_gpio::{close_sysfs_indicators, open_sysfs_indicators, IndicatorPins, SysfsIndicators};
