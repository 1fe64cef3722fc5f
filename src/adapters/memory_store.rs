//! In-memory [`ByteStore`] for host builds and tests.
//!
//! Mirrors the 24C16 geometry (2048 cells, erased to 0xFF) and counts
//! writes so callers can assert "no write happened".

use crate::app::ports::{ByteStore, StorageError};
use crate::config::EEPROM_CAPACITY;

pub struct MemoryStore {
    cells: Vec<u8>,
    writes: usize,
    fault: Option<StorageError>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            cells: vec![0xFF; usize::from(EEPROM_CAPACITY)],
            writes: 0,
            fault: None,
        }
    }

    /// Number of successful `write_byte` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Raw cell contents, bypassing the port.
    pub fn peek(&self, address: u16) -> Option<u8> {
        self.cells.get(usize::from(address)).copied()
    }

    /// Cells `start..start + len`, bypassing the port.
    pub fn slice(&self, start: u16, len: usize) -> &[u8] {
        let start = usize::from(start).min(self.cells.len());
        let end = start.saturating_add(len).min(self.cells.len());
        &self.cells[start..end]
    }

    /// Make every following access fail with `fault` (or heal with `None`).
    pub fn set_fault(&mut self, fault: Option<StorageError>) {
        self.fault = fault;
    }

    fn check(&self, address: u16) -> Result<usize, StorageError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if address >= EEPROM_CAPACITY {
            return Err(StorageError::OutOfRange(address));
        }
        Ok(usize::from(address))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStore for MemoryStore {
    fn write_byte(&mut self, address: u16, byte: u8) -> Result<(), StorageError> {
        let idx = self.check(address)?;
        self.cells[idx] = byte;
        self.writes += 1;
        Ok(())
    }

    fn read_byte(&mut self, address: u16) -> Result<u8, StorageError> {
        let idx = self.check(address)?;
        Ok(self.cells[idx])
    }
}
