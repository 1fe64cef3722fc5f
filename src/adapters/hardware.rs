//! Hardware adapter: bridges the motor and buzzer drivers to
//! [`ActuatorPort`].
//!
//! This is the only place where the domain's motor and buzzer commands
//! meet real pins.  Generic over embedded-hal pins, so the binary plugs
//! in `esp-idf-hal` drivers and the tests plug in fakes.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{ActuatorError, ActuatorPort, Rotation};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::motor::DcMotor;

/// Concrete adapter that combines the lock's actuators behind one port.
pub struct HardwareAdapter<IN1, IN2, EN, BZ> {
    motor: DcMotor<IN1, IN2, EN>,
    buzzer: Buzzer<BZ>,
}

impl<IN1, IN2, EN, BZ> HardwareAdapter<IN1, IN2, EN, BZ>
where
    IN1: OutputPin,
    IN2: OutputPin,
    EN: SetDutyCycle,
    BZ: OutputPin,
{
    pub fn new(motor: DcMotor<IN1, IN2, EN>, buzzer: Buzzer<BZ>) -> Self {
        Self { motor, buzzer }
    }

    pub fn motor(&self) -> &DcMotor<IN1, IN2, EN> {
        &self.motor
    }

    pub fn buzzer(&self) -> &Buzzer<BZ> {
        &self.buzzer
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<IN1, IN2, EN, BZ> ActuatorPort for HardwareAdapter<IN1, IN2, EN, BZ>
where
    IN1: OutputPin,
    IN2: OutputPin,
    EN: SetDutyCycle,
    BZ: OutputPin,
{
    fn rotate(&mut self, rotation: Rotation, speed_percent: u8) -> Result<(), ActuatorError> {
        self.motor.rotate(rotation, speed_percent)
    }

    fn buzzer_on(&mut self) -> Result<(), ActuatorError> {
        self.buzzer.on()
    }

    fn buzzer_off(&mut self) -> Result<(), ActuatorError> {
        self.buzzer.off()
    }

    /// Attempts both outputs even if the first one fails.
    fn all_off(&mut self) -> Result<(), ActuatorError> {
        let motor = self.motor.stop();
        let buzzer = self.buzzer.off();
        motor.and(buzzer)
    }
}
