//! Sensirion SHT4x / SHT3x humidity-and-temperature transducers.
//!
//! Both families answer at the same I2C address and share the same
//! response framing: two 16-bit big-endian words, each followed by a
//! CRC-8 byte. They differ in command width and RH conversion, so probing
//! one family against a device of the other fails with a NACK or a CRC
//! mismatch rather than a plausible reading.

pub mod sht3x;
pub mod sht4x;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, I2c};
use thiserror::Error;

use heat_logger_core::models::error::{ProbeError, SensorFault};
use heat_logger_core::models::readings::{Measurement, TransducerVariant};
use heat_logger_core::traits::transducer::{TransducerDevice, TransducerProber};

pub use sht3x::Sht3x;
pub use sht4x::Sht4x;

/// Default I2C address of both families (ADDR pin low / "-A" parts).
pub const DEFAULT_ADDRESS: u8 = 0x44;

const CRC_POLYNOMIAL: u8 = 0x31;
const CRC_INIT: u8 = 0xFF;

/// Driver-level failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShtError {
    #[error("no acknowledge from 0x{0:02x}")]
    NoAcknowledge(u8),

    #[error("CRC mismatch in response")]
    Crc,

    #[error("i2c error: {0}")]
    Bus(String),
}

impl ShtError {
    pub(crate) fn from_i2c<E: embedded_hal::i2c::Error>(address: u8, err: E) -> Self {
        match err.kind() {
            ErrorKind::NoAcknowledge(_) => Self::NoAcknowledge(address),
            _ => Self::Bus(format!("{:?}", err)),
        }
    }
}

impl From<ShtError> for ProbeError {
    /// A NACK or a garbled reply means "not this variant"; anything else is
    /// a bus fault.
    fn from(err: ShtError) -> Self {
        match err {
            ShtError::NoAcknowledge(_) | ShtError::Crc => ProbeError::NotFound,
            ShtError::Bus(reason) => ProbeError::Bus(reason),
        }
    }
}

impl From<ShtError> for SensorFault {
    fn from(err: ShtError) -> Self {
        SensorFault(err.to_string())
    }
}

/// CRC-8 (poly 0x31, init 0xFF, no reflection) over `data`.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Split a `[msb, lsb, crc]*` response into CRC-checked words.
pub(crate) fn checked_words<const N: usize>(buf: &[u8]) -> Result<[u16; N], ShtError> {
    if buf.len() != N * 3 {
        return Err(ShtError::Bus(format!(
            "expected {} response bytes, got {}",
            N * 3,
            buf.len()
        )));
    }
    let mut words = [0u16; N];
    for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
        if crc8(&chunk[..2]) != chunk[2] {
            return Err(ShtError::Crc);
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
}

/// Raw temperature word to °C; identical for both families.
pub(crate) fn temperature_from_raw(raw: u16) -> f64 {
    -45.0 + 175.0 * f64::from(raw) / 65535.0
}

/// Active transducer of either family.
pub enum ShtDevice<I2C, D> {
    Sht4x(Sht4x<I2C, D>),
    Sht3x(Sht3x<I2C, D>),
}

impl<I2C, D> TransducerDevice for ShtDevice<I2C, D>
where
    I2C: I2c + Send,
    D: DelayNs + Send,
{
    fn variant(&self) -> TransducerVariant {
        match self {
            Self::Sht4x(_) => TransducerVariant::Sht4x,
            Self::Sht3x(_) => TransducerVariant::Sht3x,
        }
    }

    fn measure(&mut self) -> Result<Measurement, SensorFault> {
        let measurement = match self {
            Self::Sht4x(sensor) => sensor.measure()?,
            Self::Sht3x(sensor) => sensor.measure()?,
        };
        Ok(measurement)
    }
}

/// Source of a fresh bus handle for each probe attempt.
///
/// A failed probe consumes its handle, so each variant is tried on a newly
/// opened bus.
pub trait BusOpener: Send {
    type Bus: I2c + Send;
    type Delay: DelayNs + Send;

    fn open(&mut self) -> Result<(Self::Bus, Self::Delay), ProbeError>;
}

/// Probes for a Sensirion part at `address`.
pub struct ShtProber<O: BusOpener> {
    opener: O,
    address: u8,
}

impl<O: BusOpener> ShtProber<O> {
    pub fn new(opener: O) -> Self {
        Self::with_address(opener, DEFAULT_ADDRESS)
    }

    pub fn with_address(opener: O, address: u8) -> Self {
        Self { opener, address }
    }
}

impl<O: BusOpener> TransducerProber for ShtProber<O> {
    type Device = ShtDevice<O::Bus, O::Delay>;

    fn probe(&mut self, variant: TransducerVariant) -> Result<Self::Device, ProbeError> {
        let (bus, delay) = self.opener.open()?;
        log::debug!("Probing {} at 0x{:02x}", variant, self.address);

        match variant {
            TransducerVariant::Sht4x => {
                let mut sensor = Sht4x::new(bus, delay, self.address);
                sensor.soft_reset()?;
                let serial = sensor.serial_number()?;
                log::info!("SHT4x serial number 0x{:08x}", serial);
                Ok(ShtDevice::Sht4x(sensor))
            }
            TransducerVariant::Sht3x => {
                let mut sensor = Sht3x::new(bus, delay, self.address);
                sensor.soft_reset()?;
                let status = sensor.status()?;
                log::info!("SHT3x status register 0x{:04x}", status);
                Ok(ShtDevice::Sht3x(sensor))
            }
        }
    }
}
