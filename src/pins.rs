//! GPIO / peripheral pin assignments for the door-lock control board.
//!
//! Single source of truth: `main` builds every driver from these numbers
//! rather than hard-coding pins.

// ---------------------------------------------------------------------------
// Door-bolt motor (L293D H-bridge, one channel)
// ---------------------------------------------------------------------------

/// Digital output: HIGH with IN2 LOW = forward (unlock).
pub const MOTOR_IN1_GPIO: i32 = 4;
/// Digital output: HIGH with IN1 LOW = reverse (lock).
pub const MOTOR_IN2_GPIO: i32 = 5;
/// LEDC PWM output on the bridge enable pin (speed).
pub const MOTOR_EN_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Alarm buzzer (active, HIGH = sounding)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// I²C bus (24C16 credential EEPROM)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// UART link to the HMI unit
// ---------------------------------------------------------------------------

pub const LINK_UART_TX_GPIO: i32 = 17;
pub const LINK_UART_RX_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC frequency for the motor enable (1 kHz, within L293D limits).
pub const MOTOR_PWM_FREQ_HZ: u32 = 1_000;
