//! GPIO output controller.
//!
//! Owns the output pin configuration, the commanded level, and the blink
//! timing.  A failed GPIO mapping at construction leaves the controller
//! inert rather than failing the caller: every level change becomes a
//! silent no-op that still reports success, and the degraded state shows
//! up in status telemetry through `is_mapped`.
//!
//! `led_on` is only ever updated after a successful pin write; it is never
//! read back from hardware.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort};

/// Construction-time parameters, resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlParams {
    pub out_pin: u32,
    pub on_time_ms: u32,
    pub off_time_ms: u32,
}

pub struct LedCtrl<G: GpioPort> {
    gpio: G,
    is_mapped: bool,
    out_pin: u32,
    led_on: bool,
    on_time_ms: u32,
    off_time_ms: u32,
}

impl<G: GpioPort> LedCtrl<G> {
    /// Map the GPIO block and configure the output pin.
    ///
    /// Never fails.  On a mapping failure an error event is emitted and the
    /// controller comes up with `is_mapped == false`.  On success the pin is
    /// driven to the off level.
    pub fn new(mut gpio: G, params: CtrlParams, sink: &mut impl EventSink) -> Self {
        let is_mapped = match gpio
            .map()
            .and_then(|()| gpio.configure_output(params.out_pin))
        {
            Ok(()) => true,
            Err(e) => {
                debug!("LedCtrl: GPIO map error: {}", e);
                sink.emit(&AppEvent::MapFailed);
                false
            }
        };

        let mut ctrl = Self {
            gpio,
            is_mapped,
            out_pin: params.out_pin,
            led_on: false,
            on_time_ms: params.on_time_ms,
            off_time_ms: params.off_time_ms,
        };

        if ctrl.is_mapped {
            ctrl.drive(false);
            info!("LedCtrl: GPIO {} configured as output", ctrl.out_pin);
        }
        ctrl
    }

    // ── Command handlers ──────────────────────────────────────

    /// Drive the pin on or off.  Always succeeds.
    pub fn set_level(&mut self, on: bool, sink: &mut impl EventSink) -> bool {
        if self.is_mapped && self.drive(on) {
            sink.emit(&AppEvent::LevelChanged {
                pin: self.out_pin,
                on,
            });
        }
        true
    }

    /// Store a new blink on time.  No limits are placed on the value.
    pub fn set_on_time(&mut self, ms: u32, sink: &mut impl EventSink) -> bool {
        self.on_time_ms = ms;
        sink.emit(&AppEvent::OnTimeSet(ms));
        true
    }

    /// Store a new blink off time.  No limits are placed on the value.
    pub fn set_off_time(&mut self, ms: u32, sink: &mut impl EventSink) -> bool {
        self.off_time_ms = ms;
        sink.emit(&AppEvent::OffTimeSet(ms));
        true
    }

    // ── Blink phases ──────────────────────────────────────────

    /// Start the on phase of a blink cycle.
    ///
    /// Returns how long to hold the phase, or `None` when unmapped.  A
    /// failed pin write still holds the phase but emits no phase event.
    pub fn enter_on_phase(&mut self, sink: &mut impl EventSink) -> Option<u32> {
        self.enter_phase(true, sink)
    }

    /// Start the off phase of a blink cycle.
    pub fn enter_off_phase(&mut self, sink: &mut impl EventSink) -> Option<u32> {
        self.enter_phase(false, sink)
    }

    fn enter_phase(&mut self, on: bool, sink: &mut impl EventSink) -> Option<u32> {
        if !self.is_mapped {
            return None;
        }
        let hold_ms = if on { self.on_time_ms } else { self.off_time_ms };
        if self.drive(on) {
            sink.emit(&AppEvent::BlinkPhase {
                pin: self.out_pin,
                on,
                hold_ms,
            });
        }
        Some(hold_ms)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_mapped(&self) -> bool {
        self.is_mapped
    }

    pub fn out_pin(&self) -> u32 {
        self.out_pin
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }

    pub fn on_time_ms(&self) -> u32 {
        self.on_time_ms
    }

    pub fn off_time_ms(&self) -> u32 {
        self.off_time_ms
    }

    /// The pin adapter, for inspection.
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    // ── Internal ──────────────────────────────────────────────

    /// Write the pin and record the level.  Returns `false` (level
    /// unchanged) if the adapter reports a write failure.
    fn drive(&mut self, on: bool) -> bool {
        let res = if on {
            self.gpio.set_high(self.out_pin)
        } else {
            self.gpio.set_low(self.out_pin)
        };
        match res {
            Ok(()) => {
                self.led_on = on;
                true
            }
            Err(e) => {
                warn!("LedCtrl: {}", e);
                false
            }
        }
    }
}
