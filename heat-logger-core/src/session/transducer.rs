use crate::models::error::{InitError, ProbeError};
use crate::models::readings::{TransducerReading, TransducerVariant};
use crate::traits::transducer::{TransducerDevice, TransducerProber};

/// Owns the active temperature/humidity transducer.
///
/// The variant is resolved once by `initialize` and never re-probed, even if
/// later reads fail: read faults are treated as transient.
pub struct TransducerSession<P: TransducerProber> {
    prober: P,
    device: Option<P::Device>,
}

impl<P: TransducerProber> TransducerSession<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober,
            device: None,
        }
    }

    /// Probe variants in `TransducerVariant::PROBE_ORDER`.
    ///
    /// Falls back to the next variant only on `ProbeError::NotFound`; any other
    /// probe failure, or running out of variants, is fatal.
    pub fn initialize(&mut self) -> Result<TransducerVariant, InitError> {
        if let Some(ref device) = self.device {
            return Ok(device.variant());
        }

        let mut tried = Vec::new();
        for variant in TransducerVariant::PROBE_ORDER {
            match self.prober.probe(variant) {
                Ok(device) => {
                    log::info!("{} sensor initialized", variant);
                    self.device = Some(device);
                    return Ok(variant);
                }
                Err(ProbeError::NotFound) => {
                    log::warn!("{} not found, trying next transducer variant", variant);
                    tried.push(variant);
                }
                Err(ProbeError::Bus(reason)) => {
                    log::error!("Bus error while probing {}: {}", variant, reason);
                    return Err(InitError::TransducerBus { variant, reason });
                }
            }
        }

        log::error!("No transducer answered; check wiring and the I2C bus address");
        Err(InitError::TransducerNotFound { tried })
    }

    /// The selected variant, once initialized.
    pub fn variant(&self) -> Option<TransducerVariant> {
        self.device.as_ref().map(|d| d.variant())
    }

    /// Take one reading. Faults are absorbed into `ReadError`.
    pub fn read(&mut self) -> TransducerReading {
        let Some(device) = self.device.as_mut() else {
            log::warn!("Transducer not initialized, skipping temperature/humidity");
            return TransducerReading::Uninitialized;
        };

        match device.measure() {
            Ok(measurement) => TransducerReading::Ok(measurement),
            Err(fault) => {
                log::error!("Error reading {} sensor: {}", device.variant(), fault);
                TransducerReading::ReadError
            }
        }
    }
}
