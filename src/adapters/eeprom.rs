//! 24C16 serial EEPROM adapter.
//!
//! Implements [`ByteStore`] over any embedded-hal 1.0 [`I2c`] bus.  The
//! 24C16 has 2048 bytes split into eight 256-byte blocks; the block number
//! rides in the low three bits of the device address:
//!
//! ```text
//!  address 0x0305 ──▶ device 0x50 | 0x3 = 0x53, word 0x05
//! ```
//!
//! A byte write starts an internal write cycle during which the chip does
//! not answer; the adapter waits it out before returning.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::debug;

use crate::app::ports::{ByteStore, StorageError};
use crate::config::EEPROM_CAPACITY;

/// 7-bit bus address of block 0.
pub const EEPROM_DEVICE_ADDRESS: u8 = 0x50;
/// Worst-case internal write cycle.
pub const WRITE_CYCLE_MS: u32 = 10;

pub struct Eeprom24c16<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Eeprom24c16<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Split a linear address into (device address, word address).
    pub fn split_address(address: u16) -> Result<(u8, u8), StorageError> {
        if address >= EEPROM_CAPACITY {
            return Err(StorageError::OutOfRange(address));
        }
        let block = ((address >> 8) & 0x07) as u8;
        Ok((EEPROM_DEVICE_ADDRESS | block, address as u8))
    }
}

impl<I2C: I2c, D: DelayNs> ByteStore for Eeprom24c16<I2C, D> {
    fn write_byte(&mut self, address: u16, byte: u8) -> Result<(), StorageError> {
        let (device, word) = Self::split_address(address)?;
        self.i2c.write(device, &[word, byte]).map_err(|e| {
            debug!("eeprom: write 0x{:04X} failed: {:?}", address, e.kind());
            StorageError::Bus
        })?;
        self.delay.delay_ms(WRITE_CYCLE_MS);
        Ok(())
    }

    fn read_byte(&mut self, address: u16) -> Result<u8, StorageError> {
        let (device, word) = Self::split_address(address)?;
        let mut buf = [0u8; 1];
        self.i2c.write_read(device, &[word], &mut buf).map_err(|e| {
            debug!("eeprom: read 0x{:04X} failed: {:?}", address, e.kind());
            StorageError::Bus
        })?;
        Ok(buf[0])
    }
}
