//! UART transport to the HMI unit (ESP-IDF only).
//!
//! Wraps an `esp-idf-hal` [`UartDriver`] as a [`Transport`] so the
//! [`SerialLink`](crate::link::SerialLink) framing runs on real hardware.
//! Reads block until at least one byte arrives, matching the link's
//! "no timeout" contract.

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;

use crate::link::transport::Transport;

pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartTransport<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl Transport for UartTransport<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.uart.read(buf, BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.uart.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.uart.wait_tx_done(BLOCK)
    }

    fn available(&self) -> bool {
        self.uart.remaining_read().map(|n| n > 0).unwrap_or(false)
    }
}
