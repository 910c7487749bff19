use crate::models::error::{IndicatorError, InitError};
use crate::traits::indicator::{IndicatorDriver, IndicatorLine};

/// The three status indicators plus their last-written levels.
pub struct StatusIndicators<D: IndicatorDriver> {
    driver: D,
    levels: [bool; 3],
}

impl<D: IndicatorDriver> StatusIndicators<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            levels: [false; 3],
        }
    }

    /// Drive every line low. Failure here is fatal: the outputs are unusable.
    pub fn initialize(&mut self) -> Result<(), InitError> {
        for line in IndicatorLine::ALL {
            self.write(line, false)
                .map_err(|e| InitError::IndicatorSetup(format!("{}: {}", line, e)))?;
        }
        log::info!("Status indicators initialized (all off)");
        Ok(())
    }

    /// Set one line. Failures are logged and otherwise ignored.
    pub fn set(&mut self, line: IndicatorLine, on: bool) {
        if let Err(e) = self.write(line, on) {
            log::warn!("Failed to drive {} indicator: {}", line, e);
        }
    }

    /// Best-effort: attempts every line even if some fail.
    pub fn all_off(&mut self) {
        for line in IndicatorLine::ALL {
            self.set(line, false);
        }
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Last level successfully written to `line`.
    pub fn level(&self, line: IndicatorLine) -> bool {
        self.levels[line.index()]
    }

    fn write(&mut self, line: IndicatorLine, on: bool) -> Result<(), IndicatorError> {
        self.driver.set(line, on)?;
        self.levels[line.index()] = on;
        Ok(())
    }
}
