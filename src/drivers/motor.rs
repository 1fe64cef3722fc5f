//! Door-bolt DC motor driver (L293D-style H-bridge).
//!
//! Two direction inputs and one PWM enable:
//!
//! | rotation | IN1  | IN2  | EN duty |
//! |----------|------|------|---------|
//! | Forward  | high | low  | speed % |
//! | Reverse  | low  | high | speed % |
//! | Stop     | low  | low  | 0 %     |
//!
//! Generic over embedded-hal 1.0 pins, so the same driver runs on the
//! ESP32 (`PinDriver` + `LedcDriver`) and against recording fakes on the
//! host.  This driver is a dumb actuator; sequencing lives in the FSM.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::Rotation;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running { rotation: Rotation, speed: u8 },
}

pub struct DcMotor<IN1, IN2, EN> {
    in1: IN1,
    in2: IN2,
    enable: EN,
    state: MotorState,
}

impl<IN1, IN2, EN> DcMotor<IN1, IN2, EN>
where
    IN1: OutputPin,
    IN2: OutputPin,
    EN: SetDutyCycle,
{
    /// Take the pins and force the bridge off.
    pub fn new(in1: IN1, in2: IN2, enable: EN) -> Result<Self, ActuatorError> {
        let mut motor = Self {
            in1,
            in2,
            enable,
            state: MotorState::Stopped,
        };
        motor.stop()?;
        Ok(motor)
    }

    /// Drive in `rotation` at `speed_percent` (clamped to 100).
    /// A zero speed or [`Rotation::Stop`] stops the motor.
    pub fn rotate(&mut self, rotation: Rotation, speed_percent: u8) -> Result<(), ActuatorError> {
        let speed = speed_percent.min(100);
        if rotation == Rotation::Stop || speed == 0 {
            return self.stop();
        }

        // Cut drive before flipping direction so the bridge never shorts.
        self.set_duty(0)?;
        match rotation {
            Rotation::Forward => {
                self.in2.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
                self.in1.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
            }
            Rotation::Reverse => {
                self.in1.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
                self.in2.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
            }
            Rotation::Stop => {}
        }
        self.set_duty(speed)?;

        self.state = MotorState::Running { rotation, speed };
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.set_duty(0)?;
        self.in1.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.in2.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.state = MotorState::Stopped;
        Ok(())
    }

    fn set_duty(&mut self, percent: u8) -> Result<(), ActuatorError> {
        self.enable
            .set_duty_cycle_percent(percent)
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, MotorState::Stopped)
    }
}
