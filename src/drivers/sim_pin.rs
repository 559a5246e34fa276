//! In-memory output pin for running without GPIO hardware.
//!
//! Clones share the same level, so a handle kept by the caller observes
//! what the controller drove.  Every transition is logged at debug level
//! and counted.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use log::debug;

#[derive(Debug, Default)]
struct PinState {
    high: AtomicBool,
    writes: AtomicU32,
}

/// Simulated digital output.
#[derive(Debug, Clone, Default)]
pub struct SimPin {
    label: &'static str,
    state: Arc<PinState>,
}

impl SimPin {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            state: Arc::default(),
        }
    }

    pub fn is_high(&self) -> bool {
        self.state.high.load(Ordering::Acquire)
    }

    /// Number of level writes since creation.
    pub fn write_count(&self) -> u32 {
        self.state.writes.load(Ordering::Relaxed)
    }

    fn drive(&self, high: bool) {
        self.state.high.store(high, Ordering::Release);
        self.state.writes.fetch_add(1, Ordering::Relaxed);
        debug!("SIM[{}]: {}", self.label, if high { "HIGH" } else { "LOW" });
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(SimPin::is_high(self))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!SimPin::is_high(self))
    }
}
