use crate::models::error::{ProbeError, SensorFault};
use crate::models::readings::{Measurement, TransducerVariant};

/// A temperature/humidity sensor that answered its probe.
///
/// Implemented by:
/// - `ShtDevice` (heat-logger-linux), wrapping the `Sht4x` or `Sht3x` driver
pub trait TransducerDevice: Send {
    /// Which variant this device speaks.
    fn variant(&self) -> TransducerVariant;

    /// Take one measurement. May block for the sensor's conversion time.
    fn measure(&mut self) -> Result<Measurement, SensorFault>;
}

/// Startup-time discovery of the transducer variant present on the bus.
///
/// Implemented by:
/// - `ShtProber` (heat-logger-linux)
pub trait TransducerProber: Send {
    type Device: TransducerDevice;

    /// Try to bring up `variant`.
    ///
    /// Must return `ProbeError::NotFound` when nothing of that variant answers,
    /// so the session can fall back to the next variant.
    fn probe(&mut self, variant: TransducerVariant) -> Result<Self::Device, ProbeError>;
}
