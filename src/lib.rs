//! Door-lock control unit firmware library.
//!
//! Exposes the protocol core and its adapters for integration testing
//! and host simulation.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod credential;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod link;
pub mod pins;
pub mod protocol;
pub mod tick;
