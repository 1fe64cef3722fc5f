//! Actuator drivers and the periodic tick source.

pub mod buzzer;
pub mod hw_timer;
pub mod motor;
