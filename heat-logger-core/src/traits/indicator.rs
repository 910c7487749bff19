use std::fmt;

use crate::models::error::IndicatorError;

/// The three status outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorLine {
    TransducerHealth,
    FixPresence,
    LoggingActivity,
}

impl IndicatorLine {
    pub const ALL: [IndicatorLine; 3] = [
        Self::TransducerHealth,
        Self::FixPresence,
        Self::LoggingActivity,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::TransducerHealth => 0,
            Self::FixPresence => 1,
            Self::LoggingActivity => 2,
        }
    }
}

impl fmt::Display for IndicatorLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransducerHealth => f.write_str("transducer-health"),
            Self::FixPresence => f.write_str("fix-presence"),
            Self::LoggingActivity => f.write_str("logging-activity"),
        }
    }
}

/// Write-only binary outputs (LEDs). No readback.
///
/// Implemented by:
/// - `PinIndicators<P>` over any embedded-hal `OutputPin` (heat-logger-linux);
///   `SysfsIndicators` is its sysfs GPIO instance
pub trait IndicatorDriver: Send {
    fn set(&mut self, line: IndicatorLine, on: bool) -> Result<(), IndicatorError>;
}
