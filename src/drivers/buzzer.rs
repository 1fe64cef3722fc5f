//! Alarm buzzer driver (active buzzer on a single GPIO, active HIGH).

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Buzzer<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Buzzer<P> {
    /// Take the pin and make sure the buzzer starts silent.
    pub fn new(pin: P) -> Result<Self, ActuatorError> {
        let mut buzzer = Self { pin, on: false };
        buzzer.off()?;
        Ok(buzzer)
    }

    pub fn on(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = true;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = false;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
