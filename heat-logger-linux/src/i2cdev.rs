//! Linux `/dev/i2c-N` bus for the Sensirion prober.

use std::path::PathBuf;

use linux_embedded_hal::{Delay, I2cdev};

use heat_logger_core::models::error::ProbeError;

use crate::sensirion::BusOpener;

pub const DEFAULT_BUS: &str = "/dev/i2c-1";

/// Opens the character device afresh for each probe.
#[derive(Debug, Clone)]
pub struct I2cdevOpener {
    path: PathBuf,
}

impl I2cdevOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for I2cdevOpener {
    fn default() -> Self {
        Self::new(DEFAULT_BUS)
    }
}

impl BusOpener for I2cdevOpener {
    type Bus = I2cdev;
    type Delay = Delay;

    fn open(&mut self) -> Result<(I2cdev, Delay), ProbeError> {
        let bus = I2cdev::new(&self.path)
            .map_err(|e| ProbeError::Bus(format!("{}: {}", self.path.display(), e)))?;
        Ok((bus, Delay))
    }
}
