//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules of the door-lock control unit:
//! registration, verification, command dispatch, lockout and the timed
//! door sequence.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod lockout;
pub mod ports;
pub mod service;
