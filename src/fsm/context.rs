//! Shared mutable context threaded through every FSM handler.
//!
//! State handlers read the phase timings and the tick clock from here and
//! write the actuator commands they want applied.  The control service
//! compares `commands` against what it last applied and drives the
//! [`ActuatorPort`](crate::app::ports::ActuatorPort) only on change.

use crate::app::ports::Rotation;
use crate::config::LockConfig;

// ---------------------------------------------------------------------------
// Phase timings (copied out of LockConfig once)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimings {
    pub unlock_ticks: u32,
    pub hold_open_ticks: u32,
    pub lock_ticks: u32,
    pub alarm_ticks: u32,
    pub motor_speed_percent: u8,
}

impl From<&LockConfig> for PhaseTimings {
    fn from(c: &LockConfig) -> Self {
        Self {
            unlock_ticks: c.unlock_ticks,
            hold_open_ticks: c.hold_open_ticks,
            lock_ticks: c.lock_ticks,
            alarm_ticks: c.alarm_ticks,
            motor_speed_percent: c.motor_speed_percent,
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommands {
    pub rotation: Rotation,
    /// Motor duty (0 when stopped).
    pub motor_speed: u8,
    pub buzzer: bool,
}

impl Default for ActuatorCommands {
    fn default() -> Self {
        Self {
            rotation: Rotation::Stop,
            motor_speed: 0,
            buzzer: false,
        }
    }
}

impl ActuatorCommands {
    /// Motor stopped and buzzer silent.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current phase was entered.
    pub ticks_in_state: u32,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    pub timings: PhaseTimings,

    // -- Actuator outputs --
    pub commands: ActuatorCommands,
}

impl FsmContext {
    pub fn new(config: &LockConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            timings: PhaseTimings::from(config),
            commands: ActuatorCommands::all_off(),
        }
    }

    pub(crate) fn drive_motor(&mut self, rotation: Rotation) {
        self.commands.rotation = rotation;
        self.commands.motor_speed = match rotation {
            Rotation::Stop => 0,
            Rotation::Forward | Rotation::Reverse => self.timings.motor_speed_percent,
        };
    }
}
