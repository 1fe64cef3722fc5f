//! Door-lock control unit entry point.
//!
//! Hexagonal architecture: the protocol core knows only port traits,
//! this file wires the ESP32 peripherals behind them.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SerialLink<UartTransport>  Eeprom24c16     HwTimer            │
//! │  (LinkPort)                 (ByteStore)     (TickSource)       │
//! │  HardwareAdapter            LogEventSink    ConfigStore        │
//! │  (ActuatorPort)             (EventSink)     (ConfigPort)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ControlService (pure logic)                 │    │
//! │  │  register · verify · lockout · door FSM                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, Resolution, config::TimerConfig};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::uart::{UartDriver, config::Config as UartConfig};

use doorlock::adapters::config_store::ConfigStore;
use doorlock::adapters::eeprom::Eeprom24c16;
use doorlock::adapters::hardware::HardwareAdapter;
use doorlock::adapters::log_sink::LogEventSink;
use doorlock::adapters::uart::UartTransport;
use doorlock::app::ports::ConfigPort;
use doorlock::app::service::ControlService;
use doorlock::config::LockConfig;
use doorlock::drivers::buzzer::Buzzer;
use doorlock::drivers::hw_timer::HwTimer;
use doorlock::drivers::motor::DcMotor;
use doorlock::link::SerialLink;
use doorlock::pins;

/// Pause before restarting after a fatal error, so the log drains.
const RESTART_DELAY_MS: u32 = 2_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  DoorLock control v{}             ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let mut peripherals = Peripherals::take()?;

    // SAFETY: each GPIO number in `pins` is claimed exactly once below.
    let (mut sda, mut scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };

    // ── 2. Load config from the EEPROM (or defaults) ──────────
    let config = {
        let bus_cfg = I2cConfig::new().baudrate(LockConfig::default().i2c_frequency_hz.Hz());
        let i2c = I2cDriver::new(&mut peripherals.i2c0, &mut sda, &mut scl, &bus_cfg)?;
        let mut eeprom = Eeprom24c16::new(i2c, FreeRtos);
        match ConfigStore::new(&mut eeprom).load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Config load failed ({}), using defaults", e);
                LockConfig::default()
            }
        }
    };
    info!(
        "Config: door {}+{}+{} ticks, alarm {} ticks after {} failures, tick {} ms",
        config.unlock_ticks,
        config.hold_open_ticks,
        config.lock_ticks,
        config.alarm_ticks,
        config.max_failed_attempts,
        config.tick_period_ms
    );

    // ── 3. Construct adapters ─────────────────────────────────
    let bus_cfg = I2cConfig::new().baudrate(config.i2c_frequency_hz.Hz());
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &bus_cfg)?;
    let eeprom = Eeprom24c16::new(i2c, FreeRtos);

    // SAFETY: see above; these GPIOs are not used anywhere else.
    let (in1, in2, en, buzzer_pin, tx, rx) = unsafe {
        (
            AnyOutputPin::new(pins::MOTOR_IN1_GPIO),
            AnyOutputPin::new(pins::MOTOR_IN2_GPIO),
            AnyOutputPin::new(pins::MOTOR_EN_GPIO),
            AnyOutputPin::new(pins::BUZZER_GPIO),
            AnyIOPin::new(pins::LINK_UART_TX_GPIO),
            AnyIOPin::new(pins::LINK_UART_RX_GPIO),
        )
    };

    let ledc_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new()
            .frequency(pins::MOTOR_PWM_FREQ_HZ.Hz())
            .resolution(Resolution::Bits8),
    )?;
    let enable = LedcDriver::new(peripherals.ledc.channel0, &ledc_timer, en)?;
    let motor = DcMotor::new(PinDriver::output(in1)?, PinDriver::output(in2)?, enable)?;
    let buzzer = Buzzer::new(PinDriver::output(buzzer_pin)?)?;
    let actuators = HardwareAdapter::new(motor, buzzer);

    let uart = UartDriver::new(
        peripherals.uart1,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(config.link_baud_rate.Hz()),
    )?;
    let link = SerialLink::new(UartTransport::new(uart));

    let mut log_sink = LogEventSink::new();

    // ── 4. Run the protocol ───────────────────────────────────
    let mut service = ControlService::new(config, link, eeprom, HwTimer::new(), actuators)?;

    let Err(e) = service.run(&mut log_sink);
    error!("Control loop stopped: {}, restarting", e);
    FreeRtos::delay_ms(RESTART_DELAY_MS);
    esp_idf_svc::hal::reset::restart();
}
