use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{checked_words, temperature_from_raw, ShtError};
use heat_logger_core::models::readings::Measurement;

const CMD_MEASURE_HIGH_PRECISION: u8 = 0xFD;
const CMD_READ_SERIAL: u8 = 0x89;
const CMD_SOFT_RESET: u8 = 0x94;

/// Worst-case high-repeatability conversion time is 8.3 ms.
const MEASURE_DELAY_MS: u32 = 10;
const COMMAND_DELAY_MS: u32 = 1;

/// SHT40/41/45 driver. One-byte commands, no-clock-stretching reads.
pub struct Sht4x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Sht4x<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// 32-bit serial number. Doubles as the presence check.
    pub fn serial_number(&mut self) -> Result<u32, ShtError> {
        let [hi, lo] = self.command_then_read::<2>(CMD_READ_SERIAL, COMMAND_DELAY_MS)?;
        Ok((u32::from(hi) << 16) | u32::from(lo))
    }

    pub fn soft_reset(&mut self) -> Result<(), ShtError> {
        self.write(CMD_SOFT_RESET)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);
        Ok(())
    }

    /// High-precision single shot.
    pub fn measure(&mut self) -> Result<Measurement, ShtError> {
        let [raw_t, raw_rh] =
            self.command_then_read::<2>(CMD_MEASURE_HIGH_PRECISION, MEASURE_DELAY_MS)?;
        Ok(Measurement {
            temperature_c: temperature_from_raw(raw_t),
            humidity_pct: humidity_from_raw(raw_rh),
        })
    }

    /// Give back the bus and delay.
    #[cfg(test)]
    pub(crate) fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn write(&mut self, command: u8) -> Result<(), ShtError> {
        self.i2c
            .write(self.address, &[command])
            .map_err(|e| ShtError::from_i2c(self.address, e))
    }

    fn command_then_read<const N: usize>(
        &mut self,
        command: u8,
        wait_ms: u32,
    ) -> Result<[u16; N], ShtError> {
        self.write(command)?;
        self.delay.delay_ms(wait_ms);

        let mut buf = [0u8; 6];
        let buf = &mut buf[..N * 3];
        self.i2c
            .read(self.address, buf)
            .map_err(|e| ShtError::from_i2c(self.address, e))?;
        checked_words::<N>(buf)
    }
}

/// The SHT4x RH transfer function can leave 0..100 near the extremes.
fn humidity_from_raw(raw: u16) -> f64 {
    (-6.0 + 125.0 * f64::from(raw) / 65535.0).clamp(0.0, 100.0)
}
