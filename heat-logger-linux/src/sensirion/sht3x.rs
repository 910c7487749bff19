use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{checked_words, temperature_from_raw, ShtError};
use heat_logger_core::models::readings::Measurement;

/// Single shot, high repeatability, clock stretching disabled.
const CMD_MEASURE_HIGH_REPEATABILITY: [u8; 2] = [0x24, 0x00];
const CMD_READ_STATUS: [u8; 2] = [0xF3, 0x2D];
const CMD_SOFT_RESET: [u8; 2] = [0x30, 0xA2];

const MEASURE_DELAY_MS: u32 = 16;
const RESET_DELAY_MS: u32 = 2;
const COMMAND_DELAY_MS: u32 = 1;

/// SHT30/31/35 driver.
pub struct Sht3x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Sht3x<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn soft_reset(&mut self) -> Result<(), ShtError> {
        self.write(CMD_SOFT_RESET)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Raw status register.
    pub fn status(&mut self) -> Result<u16, ShtError> {
        let [status] = self.command_then_read::<1>(CMD_READ_STATUS, COMMAND_DELAY_MS)?;
        Ok(status)
    }

    pub fn measure(&mut self) -> Result<Measurement, ShtError> {
        let [raw_t, raw_rh] =
            self.command_then_read::<2>(CMD_MEASURE_HIGH_REPEATABILITY, MEASURE_DELAY_MS)?;
        Ok(Measurement {
            temperature_c: temperature_from_raw(raw_t),
            humidity_pct: humidity_from_raw(raw_rh),
        })
    }

    #[cfg(test)]
    pub(crate) fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn write(&mut self, command: [u8; 2]) -> Result<(), ShtError> {
        self.i2c
            .write(self.address, &command)
            .map_err(|e| ShtError::from_i2c(self.address, e))
    }

    fn command_then_read<const N: usize>(
        &mut self,
        command: [u8; 2],
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

fn humidity_from_raw(raw: u16) -> f64 {
    (100.0 * f64::from(raw) / 65535.0).clamp(0.0, 100.0)
}
