//! Port traits: the hexagonal boundary between the lock logic and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (serial link, EEPROM, hardware timer, motor + buzzer,
//! event sinks) implement these traits.  The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the protocol logic never touches hardware directly and
//! runs unchanged against the mocks in `tests/integration/`.
//!
//! ## Security notes
//!
//! - **ByteStore** holds the door credential in clear; the EEPROM must sit
//!   inside the locked enclosure.
//! - **ConfigPort** implementations MUST validate before persisting.

use core::fmt;

use heapless::Vec;

use crate::config::LockConfig;
use crate::credential::MAX_CREDENTIAL_LEN;
use crate::tick::SharedListener;

// ───────────────────────────────────────────────────────────────
// Link port (peer controller ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Data bytes of one received password frame, terminator stripped.
pub type Frame = Vec<u8, MAX_CREDENTIAL_LEN>;

/// Reliable, synchronous byte channel to the HMI controller.
///
/// Every receive blocks until data arrives; there is no timeout.
pub trait LinkPort {
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError>;

    fn receive_byte(&mut self) -> Result<u8, LinkError>;

    /// Send `data` followed by the wire terminator.
    fn send_string(&mut self, data: &[u8]) -> Result<(), LinkError>;

    /// Receive bytes up to the wire terminator.  The terminator is consumed
    /// from the stream but not returned.
    fn receive_string(&mut self) -> Result<Frame, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Byte store port (domain ↔ EEPROM)
// ───────────────────────────────────────────────────────────────

/// Byte-addressable non-volatile storage.
pub trait ByteStore {
    fn write_byte(&mut self, address: u16, byte: u8) -> Result<(), StorageError>;

    fn read_byte(&mut self, address: u16) -> Result<u8, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Tick source port (hardware timer → domain)
// ───────────────────────────────────────────────────────────────

/// Clock divider applied ahead of the timer counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prescaler {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl Prescaler {
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div8 => 8,
            Self::Div64 => 64,
            Self::Div256 => 256,
            Self::Div1024 => 1024,
        }
    }
}

/// Whether the interrupt fires on compare match or on counter overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Compare,
    Overflow,
}

/// Register-level description of a periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Counter value loaded at start.
    pub initial_count: u32,
    /// Compare value (Compare mode) or top of count (Overflow mode).
    pub target: u32,
    pub prescaler: Prescaler,
    pub mode: TimerMode,
    /// Timer input clock before the prescaler.
    pub clock_hz: u32,
}

impl TimerConfig {
    /// Configuration for a tick every `period_ms` on a 1 MHz timer clock.
    pub const fn periodic_ms(period_ms: u32) -> Self {
        Self {
            initial_count: 0,
            target: period_ms.saturating_mul(1000).saturating_sub(1),
            prescaler: Prescaler::Div1,
            mode: TimerMode::Compare,
            clock_hz: 1_000_000,
        }
    }

    /// Interval between two interrupts, in microseconds.
    pub fn period_us(&self) -> u64 {
        let counts = u64::from(self.target.saturating_sub(self.initial_count)) + 1;
        counts * u64::from(self.prescaler.divisor()) * 1_000_000 / u64::from(self.clock_hz.max(1))
    }
}

/// Periodic interrupt source.
///
/// The listener is injected once at startup; while started, the source
/// calls [`TickListener::on_tick`](crate::tick::TickListener::on_tick)
/// once per configured interval.
pub trait TickSource {
    fn configure(&mut self, config: &TimerConfig) -> Result<(), TimerError>;

    fn set_listener(&mut self, listener: SharedListener);

    fn start(&mut self) -> Result<(), TimerError>;

    fn stop(&mut self) -> Result<(), TimerError>;

    /// Yield the CPU until the next interrupt may have fired.
    /// Called from the service's wait loop; must not block indefinitely.
    fn idle(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → motor + buzzer)
// ───────────────────────────────────────────────────────────────

/// Door-bolt motor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Clockwise, unlocks the door.
    Forward,
    /// Anti-clockwise, locks the door.
    Reverse,
    Stop,
}

pub trait ActuatorPort {
    /// Drive the motor.  `speed_percent` is ignored for [`Rotation::Stop`].
    fn rotate(&mut self, rotation: Rotation, speed_percent: u8) -> Result<(), ActuatorError>;

    fn buzzer_on(&mut self) -> Result<(), ActuatorError>;

    fn buzzer_off(&mut self) -> Result<(), ActuatorError>;

    /// Motor stopped, buzzer silent.  Used by the fail-safe path.
    fn all_off(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`LockConfig`].
///
/// Implementations MUST validate before persisting, so a corrupted or
/// tampered block can never shorten the lockout or disable the alarm.
pub trait ConfigPort {
    /// Returns [`LockConfig::default()`] if no stored config exists.
    fn load(&mut self) -> Result<LockConfig, ConfigError>;

    fn save(&mut self, config: &LockConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

pub use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport closed or failed while reading.
    Disconnected,
    /// The transport refused outgoing bytes.
    WriteFailed,
    /// A string frame exceeded the password capacity.  The frame has been
    /// drained up to its terminator, so the link is still in sync.
    FrameTooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Address outside the device.
    OutOfRange(u16),
    /// Bus transaction failed.
    Bus,
    /// No data at the requested location.
    NotFound,
    /// Stored data failed an integrity check.
    Corrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    NotConfigured,
    CreateFailed(i32),
    StartFailed(i32),
    StopFailed(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// The underlying byte store failed.
    Storage(StorageError),
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "peer disconnected"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::FrameTooLong => write!(f, "frame too long"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(addr) => write!(f, "address 0x{:04X} out of range", addr),
            Self::Bus => write!(f, "bus error"),
            Self::NotFound => write!(f, "not found"),
            Self::Corrupted => write!(f, "corrupted"),
        }
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "not configured"),
            Self::CreateFailed(rc) => write!(f, "create failed (rc={})", rc),
            Self::StartFailed(rc) => write!(f, "start failed (rc={})", rc),
            Self::StopFailed(rc) => write!(f, "stop failed (rc={})", rc),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}
