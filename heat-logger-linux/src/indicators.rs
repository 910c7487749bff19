use embedded_hal::digital::OutputPin;

use heat_logger_core::models::error::IndicatorError;
use heat_logger_core::traits::indicator::{IndicatorDriver, IndicatorLine};

/// Three digital outputs driven as status indicators, active high.
pub struct PinIndicators<P> {
    transducer_health: P,
    fix_presence: P,
    logging_activity: P,
}

impl<P: OutputPin + Send> PinIndicators<P> {
    pub fn new(transducer_health: P, fix_presence: P, logging_activity: P) -> Self {
        Self {
            transducer_health,
            fix_presence,
            logging_activity,
        }
    }

    /// Give back the pins in `IndicatorLine::ALL` order.
    pub fn into_pins(self) -> [P; 3] {
        [
            self.transducer_health,
            self.fix_presence,
            self.logging_activity,
        ]
    }

    fn pin(&mut self, line: IndicatorLine) -> &mut P {
        match line {
            IndicatorLine::TransducerHealth => &mut self.transducer_health,
            IndicatorLine::FixPresence => &mut self.fix_presence,
            IndicatorLine::LoggingActivity => &mut self.logging_activity,
        }
    }
}

impl<P: OutputPin + Send> IndicatorDriver for PinIndicators<P> {
    fn set(&mut self, line: IndicatorLine, on: bool) -> Result<(), IndicatorError> {
        let pin = self.pin(line);
        let result = if on { pin.set_high() } else { pin.set_low() };
        result.map_err(|e| IndicatorError(format!("{:?}", e)))
    }
}
