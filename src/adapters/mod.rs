//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                  |
//! |----------------|--------------|------------------------------|
//! | `hardware`     | ActuatorPort | H-bridge motor, buzzer GPIO  |
//! | `eeprom`       | ByteStore    | 24C16 over I2C               |
//! | `memory_store` | ByteStore    | RAM (host / tests)           |
//! | `config_store` | ConfigPort   | any ByteStore                |
//! | `log_sink`     | EventSink    | Serial log output            |
//! | `uart`         | Transport    | ESP-IDF UART (espidf only)   |

pub mod config_store;
pub mod eeprom;
pub mod hardware;
pub mod log_sink;
pub mod memory_store;
#[cfg(target_os = "espidf")]
pub mod uart;
