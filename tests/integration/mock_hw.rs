//! Mock adapters for integration tests.
//!
//! Records every GPIO call and every emitted event so tests can assert on
//! the full history without touching real pins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use rpi_led::app::events::AppEvent;
use rpi_led::app::ports::{EventSink, GpioPort};
use rpi_led::config::{AppConfig, CtrlMode};
use rpi_led::error::GpioError;

// ── GPIO call record ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    Map,
    Configure(u32),
    High(u32),
    Low(u32),
}

// ── MockGpio ──────────────────────────────────────────────────

pub struct MockGpio {
    pub calls: Vec<GpioCall>,
    map_fails: bool,
}

#[allow(dead_code)]
impl MockGpio {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            map_fails: false,
        }
    }

    /// A GPIO block whose `map()` always fails.
    pub fn failing_map() -> Self {
        Self {
            calls: Vec::new(),
            map_fails: true,
        }
    }
}

impl Default for MockGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for MockGpio {
    fn map(&mut self) -> Result<(), GpioError> {
        self.calls.push(GpioCall::Map);
        if self.map_fails {
            Err(GpioError::MapFailed)
        } else {
            Ok(())
        }
    }

    fn configure_output(&mut self, pin: u32) -> Result<(), GpioError> {
        self.calls.push(GpioCall::Configure(pin));
        Ok(())
    }

    fn set_high(&mut self, pin: u32) -> Result<(), GpioError> {
        self.calls.push(GpioCall::High(pin));
        Ok(())
    }

    fn set_low(&mut self, pin: u32) -> Result<(), GpioError> {
        self.calls.push(GpioCall::Low(pin));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Thread-safe event recorder.  Clones share the same history.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AppEvent>>>,
    filter_resets: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<AppEvent> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn count_where(&self, f: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| f(e)).count()
    }

    pub fn filter_resets(&self) -> usize {
        self.filter_resets.load(Ordering::SeqCst)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn reset_filters(&mut self) {
        self.filter_resets.fetch_add(1, Ordering::SeqCst);
    }
}

// ── RecordingDelay ────────────────────────────────────────────

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

// ── Config helpers ────────────────────────────────────────────

#[allow(dead_code)]
pub fn config(mode: CtrlMode, pin: u32) -> AppConfig {
    AppConfig {
        ctrl_mode: mode,
        ctrl_out_pin: pin,
        ctrl_on_time_ms: 10,
        ctrl_off_time_ms: 20,
        ..Default::default()
    }
}
