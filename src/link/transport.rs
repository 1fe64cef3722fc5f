//! Transport abstraction: any byte-oriented channel to the HMI unit.
//!
//! Concrete implementations:
//! - UART (ESP-IDF, [`crate::adapters::uart::UartTransport`])
//! - [`BufferTransport`], an in-memory script used on the host
//!
//! [`SerialLink`](super::SerialLink) is generic over `Transport`, so the
//! framing rules never change with the physical channel.

use std::collections::VecDeque;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read; 0 means "nothing yet".
    /// An `Err` means the channel is gone.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// Returned by [`BufferTransport`] once its inbound script is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

/// In-memory transport: reads drain a scripted inbound queue, writes are
/// recorded.  Reading past the end of the script reports [`Exhausted`],
/// which the link turns into a disconnect.
#[derive(Debug, Default)]
pub struct BufferTransport {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl BufferTransport {
    pub fn with_inbound(bytes: &[u8]) -> Self {
        Self {
            inbound: bytes.iter().copied().collect(),
            outbound: Vec::new(),
        }
    }

    /// Append more peer bytes to the script.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    /// Everything written so far.
    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    /// Take everything written so far.
    pub fn take_outbound(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.outbound)
    }

    /// Scripted bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inbound.len()
    }
}

impl Transport for BufferTransport {
    type Error = Exhausted;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Exhausted> {
        if self.inbound.is_empty() {
            return Err(Exhausted);
        }
        let mut n = 0;
        for slot in buf.iter_mut() {
            match self.inbound.pop_front() {
                Some(b) => {
                    *slot = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Exhausted> {
        self.outbound.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Exhausted> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.inbound.is_empty()
    }
}
