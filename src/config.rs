//! System configuration parameters
//!
//! All tunable parameters for the door-lock control unit.
//! Values can be overridden by a config block persisted in the EEPROM
//! (see [`crate::adapters::config_store`]).

use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, TimerConfig};
use crate::credential::STORED_CREDENTIAL_LEN;

/// Size of the 24C16 EEPROM in bytes.
pub const EEPROM_CAPACITY: u16 = 2048;

/// Start of the reserved config block.
pub const CONFIG_REGION_START: u16 = 0x0000;
/// Bytes reserved for the config block (magic + length + payload).
pub const CONFIG_REGION_LEN: u16 = 0x40;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    // --- Door sequence ---
    /// Ticks the motor runs forward to retract the bolt
    pub unlock_ticks: u32,
    /// Ticks the door stays unlocked with the motor stopped
    pub hold_open_ticks: u32,
    /// Ticks the motor runs in reverse to throw the bolt
    pub lock_ticks: u32,
    /// Motor PWM duty cycle (1-100%)
    pub motor_speed_percent: u8,

    // --- Intrusion response ---
    /// Wrong passwords in a row before the alarm sounds
    pub max_failed_attempts: u8,
    /// Ticks the buzzer sounds while the unit ignores the peer
    pub alarm_ticks: u32,

    // --- Storage ---
    /// First EEPROM cell of the stored credential
    pub credential_base_address: u16,

    // --- Timing ---
    /// Length of one tick (milliseconds)
    pub tick_period_ms: u32,

    // --- Buses ---
    /// Serial link baud rate
    pub link_baud_rate: u32,
    /// EEPROM I2C clock
    pub i2c_frequency_hz: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            // Door sequence
            unlock_ticks: 15,
            hold_open_ticks: 3,
            lock_ticks: 15,
            motor_speed_percent: 100,

            // Intrusion response
            max_failed_attempts: 3,
            alarm_ticks: 60,

            // Storage
            credential_base_address: 0x0300,

            // Timing
            tick_period_ms: 1000, // 1 Hz

            // Buses
            link_baud_rate: 9600,
            i2c_frequency_hz: 100_000,
        }
    }
}

impl LockConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unlock_ticks == 0 || self.hold_open_ticks == 0 || self.lock_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "door phase durations must be at least 1 tick",
            ));
        }
        if self.alarm_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "alarm_ticks must be at least 1",
            ));
        }
        if self.max_failed_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_failed_attempts must be at least 1",
            ));
        }
        if !(1..=100).contains(&self.motor_speed_percent) {
            return Err(ConfigError::ValidationFailed(
                "motor_speed_percent must be 1–100",
            ));
        }
        if !(10..=60_000).contains(&self.tick_period_ms) {
            return Err(ConfigError::ValidationFailed(
                "tick_period_ms must be 10–60000",
            ));
        }
        if self.link_baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("link_baud_rate must be > 0"));
        }
        if self.i2c_frequency_hz == 0 {
            return Err(ConfigError::ValidationFailed(
                "i2c_frequency_hz must be > 0",
            ));
        }
        let cred_start = u32::from(self.credential_base_address);
        let cred_end = cred_start + STORED_CREDENTIAL_LEN as u32;
        if cred_start < u32::from(CONFIG_REGION_START + CONFIG_REGION_LEN) {
            return Err(ConfigError::ValidationFailed(
                "credential region overlaps the config block",
            ));
        }
        if cred_end > u32::from(EEPROM_CAPACITY) {
            return Err(ConfigError::ValidationFailed(
                "credential region runs past the EEPROM",
            ));
        }
        Ok(())
    }

    /// Tick source configuration for [`Self::tick_period_ms`].
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::periodic_ms(self.tick_period_ms)
    }

    /// Wall-clock length of the full door sequence (milliseconds).
    pub fn door_cycle_ms(&self) -> u64 {
        let ticks = u64::from(self.unlock_ticks)
            + u64::from(self.hold_open_ticks)
            + u64::from(self.lock_ticks);
        ticks * u64::from(self.tick_period_ms)
    }
}
