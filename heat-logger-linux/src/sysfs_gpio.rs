//! Indicator outputs on sysfs GPIO lines (`/sys/class/gpio`).

use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::SysfsPin;

use heat_logger_core::models::error::IndicatorError;

use crate::indicators::PinIndicators;

/// BCM line numbers for the three indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorPins {
    pub transducer_health: u64,
    pub fix_presence: u64,
    pub logging_activity: u64,
}

impl Default for IndicatorPins {
    fn default() -> Self {
        Self {
            transducer_health: 16,
            fix_presence: 20,
            logging_activity: 21,
        }
    }
}

pub type SysfsIndicators = PinIndicators<SysfsPin>;

/// Export each line and configure it as an output driven low.
pub fn open_sysfs_indicators(pins: IndicatorPins) -> Result<SysfsIndicators, IndicatorError> {
    Ok(PinIndicators::new(
        export_output(pins.transducer_health)?,
        export_output(pins.fix_presence)?,
        export_output(pins.logging_activity)?,
    ))
}

/// Release the lines back to the kernel. Best-effort.
pub fn close_sysfs_indicators(indicators: SysfsIndicators) {
    for pin in indicators.into_pins() {
        if let Err(e) = pin.unexport() {
            log::warn!("Failed to unexport GPIO {}: {}", pin.get_pin_num(), e);
        }
    }
}

fn export_output(line: u64) -> Result<SysfsPin, IndicatorError> {
    let pin = SysfsPin::new(line);
    pin.export()
        .map_err(|e| IndicatorError(format!("export GPIO {}: {}", line, e)))?;
    pin.set_direction(Direction::Low)
        .map_err(|e| IndicatorError(format!("configure GPIO {}: {}", line, e)))?;
    log::debug!("GPIO {} exported as output", line);
    Ok(pin)
}
