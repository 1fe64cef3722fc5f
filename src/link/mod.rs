//! Serial link to the HMI unit.
//!
//! [`SerialLink`] adds the peer protocol's framing on top of any
//! [`Transport`]: single bytes travel as-is, password strings travel
//! as data bytes followed by [`WIRE_TERMINATOR`].
//!
//! ```text
//!  "123" ──▶ 0x31 0x32 0x33 '#'
//! ```

pub mod transport;

use heapless::Vec;
use log::{debug, warn};

use crate::app::ports::{Frame, LinkError, LinkPort};
use crate::protocol::WIRE_TERMINATOR;

use transport::Transport;

/// Framing layer implementing [`LinkPort`] over a byte transport.
pub struct SerialLink<T> {
    transport: T,
}

impl<T: Transport> SerialLink<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), LinkError> {
        let mut rest = data;
        while !rest.is_empty() {
            match self.transport.write(rest) {
                Ok(0) => return Err(LinkError::WriteFailed),
                Ok(n) => rest = &rest[n.min(rest.len())..],
                Err(e) => {
                    warn!("Link write failed: {:?}", e);
                    return Err(LinkError::WriteFailed);
                }
            }
        }
        self.transport.flush().map_err(|e| {
            warn!("Link flush failed: {:?}", e);
            LinkError::WriteFailed
        })
    }
}

impl<T: Transport> LinkPort for SerialLink<T> {
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        self.write_all(&[byte])
    }

    fn receive_byte(&mut self) -> Result<u8, LinkError> {
        let mut buf = [0u8; 1];
        loop {
            match self.transport.read(&mut buf) {
                Ok(0) => continue,
                Ok(_) => return Ok(buf[0]),
                Err(e) => {
                    debug!("Link read failed: {:?}", e);
                    return Err(LinkError::Disconnected);
                }
            }
        }
    }

    fn send_string(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.write_all(data)?;
        self.write_all(&[WIRE_TERMINATOR])
    }

    /// Over-long frames are drained up to their terminator before
    /// [`LinkError::FrameTooLong`] is returned.
    fn receive_string(&mut self) -> Result<Frame, LinkError> {
        let mut frame: Frame = Vec::new();
        let mut overflowed = false;
        loop {
            let byte = self.receive_byte()?;
            if byte == WIRE_TERMINATOR {
                break;
            }
            if !overflowed && frame.push(byte).is_err() {
                overflowed = true;
            }
        }
        if overflowed {
            warn!("Link frame exceeded {} bytes, dropped", frame.capacity());
            return Err(LinkError::FrameTooLong);
        }
        Ok(frame)
    }
}
