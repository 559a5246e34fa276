//! `embedded-hal` output pin adapter.
//!
//! Wraps a single [`OutputPin`] and exposes it as [`GpioPort`] under a
//! fixed pin number.  Any HAL that implements `embedded-hal` 1.0 (a
//! `linux-embedded-hal` CDev pin, or [`SimPin`](crate::drivers::sim_pin::SimPin)
//! for development hosts) plugs in here.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::GpioPort;
use crate::error::GpioError;

pub struct HalGpio<P> {
    pin_no: u32,
    pin: P,
    mapped: bool,
}

impl<P: OutputPin> HalGpio<P> {
    /// `pin_no` is the number the controller will address this pin by.
    pub fn new(pin_no: u32, pin: P) -> Self {
        Self {
            pin_no,
            pin,
            mapped: false,
        }
    }

    fn check(&self, pin: u32) -> Result<(), GpioError> {
        if !self.mapped {
            Err(GpioError::NotMapped)
        } else if pin != self.pin_no {
            Err(GpioError::UnknownPin(pin))
        } else {
            Ok(())
        }
    }
}

impl<P: OutputPin> GpioPort for HalGpio<P> {
    fn map(&mut self) -> Result<(), GpioError> {
        // The HAL pin was claimed when it was constructed.
        self.mapped = true;
        Ok(())
    }

    fn configure_output(&mut self, pin: u32) -> Result<(), GpioError> {
        self.check(pin)?;
        debug!("hal: GPIO {} already in output mode", pin);
        Ok(())
    }

    fn set_high(&mut self, pin: u32) -> Result<(), GpioError> {
        self.check(pin)?;
        self.pin.set_high().map_err(|_| GpioError::WriteFailed(pin))
    }

    fn set_low(&mut self, pin: u32) -> Result<(), GpioError> {
        self.check(pin)?;
        self.pin.set_low().map_err(|_| GpioError::WriteFailed(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim_pin::SimPin;

    #[test]
    fn drives_only_its_own_pin() {
        let probe = SimPin::new("t");
        let mut gpio = HalGpio::new(17, probe.clone());
        assert_eq!(gpio.set_high(17), Err(GpioError::NotMapped));

        gpio.map().unwrap();
        gpio.configure_output(17).unwrap();
        gpio.set_high(17).unwrap();
        assert!(probe.is_high());

        assert_eq!(gpio.set_low(4), Err(GpioError::UnknownPin(4)));
        assert!(probe.is_high());
    }
}
