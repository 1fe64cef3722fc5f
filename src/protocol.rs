//! Inter-controller wire protocol constants.
//!
//! The HMI unit and this control unit exchange single-byte tokens and
//! terminated password strings over the serial link, strictly in
//! request/response order:
//!
//! ```text
//!  HMI                                 CONTROL
//!   │── READY ───────────────────────────▶│
//!   │── "pass#" ─────────────────────────▶│   registration: two strings
//!   │── "pass#" ─────────────────────────▶│   verification: string + command
//!   │◀──────────────────────────── READY ─│
//!   │◀─────────────── ACCEPTED / DENIED ──│
//! ```

/// "I am ready" handshake byte, sent by whichever side is about to talk.
pub const READY: u8 = 0xFF;
/// Credential accepted.
pub const ACCEPTED: u8 = 0x01;
/// Credential rejected.
pub const DENIED: u8 = 0x00;
/// Too many wrong attempts; the alarm cycle is starting.
pub const ERROR_DETECTED: u8 = 0xFE;

/// Marks the end of a password string on the wire.
pub const WIRE_TERMINATOR: u8 = b'#';
/// Marks the end of the credential in the byte store.
pub const STORE_TERMINATOR: u8 = 0x00;

/// Verdict tokens the control unit sends after a READY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Reply {
    Accepted = ACCEPTED,
    Denied = DENIED,
    ErrorDetected = ERROR_DETECTED,
}

impl Reply {
    pub const fn byte(self) -> u8 {
        self as u8
    }
}
