//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the command manager and the shared LED
//! controller.  It decodes command records, routes them to the
//! controller, keeps the valid/invalid counters, and assembles status
//! snapshots.  Pin access goes through the [`GpioPort`] the controller
//! was built with; events leave through the [`EventSink`] passed at each
//! call site.
//!
//! ```text
//!  command record ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                     │        AppService         │
//!       GpioPort  ◀── │  CommandManager · LedCtrl │ ──▶ StatusSnapshot
//!                     └──────────────────────────┘
//! ```

use std::sync::Arc;

use log::{info, warn};

use crate::config::{AppConfig, CtrlMode};
use crate::control::{self, CtrlParams, LedCtrl, SharedLedCtrl};

use super::commands::AppCommand;
use super::dispatch::{CommandManager, DispatchError};
use super::events::{AppEvent, BlinkTiming, StatusSnapshot};
use super::ports::{EventSink, GpioPort};

/// Version string reported at start-up and by the no-op command.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppService<G: GpioPort> {
    mode: CtrlMode,
    cmds: CommandManager,
    ctrl: Arc<SharedLedCtrl<G>>,
}

impl<G: GpioPort> AppService<G> {
    /// Build the controller (which attempts the GPIO mapping) and
    /// announce start-up.  A mapping failure does not fail construction.
    pub fn new(config: &AppConfig, gpio: G, sink: &mut impl EventSink) -> Self {
        let params = CtrlParams {
            out_pin: config.ctrl_out_pin,
            on_time_ms: config.ctrl_on_time_ms,
            off_time_ms: config.ctrl_off_time_ms,
        };
        let ctrl = control::share(LedCtrl::new(gpio, params, sink));

        sink.emit(&AppEvent::Started {
            version: APP_VERSION,
        });
        info!("AppService started in {:?} mode", config.ctrl_mode);

        Self {
            mode: config.ctrl_mode,
            cmds: CommandManager::new(config.ctrl_mode),
            ctrl,
        }
    }

    /// Handle to the controller for the blink worker.
    pub fn controller(&self) -> Arc<SharedLedCtrl<G>> {
        Arc::clone(&self.ctrl)
    }

    // ── Command handling ──────────────────────────────────────

    /// Decode and execute one command record from the bus.
    pub fn handle_record(
        &mut self,
        record: &[u8],
        sink: &mut impl EventSink,
    ) -> Result<(), DispatchError> {
        match self.cmds.decode(record) {
            Ok(cmd) => self.handle_command(cmd, sink),
            Err(e) => {
                self.reject(e, sink);
                Err(e)
            }
        }
    }

    /// Execute an already-decoded command.
    ///
    /// Commands outside the active mode's table are rejected exactly as
    /// they would be on the wire.  Reset is not itself counted.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        sink: &mut impl EventSink,
    ) -> Result<(), DispatchError> {
        let op = cmd.opcode();
        if !self.cmds.is_registered(op) {
            let e = DispatchError::NotRegistered(op);
            self.reject(e, sink);
            return Err(e);
        }

        let ok = match cmd {
            AppCommand::Noop => {
                sink.emit(&AppEvent::Noop {
                    version: APP_VERSION,
                });
                true
            }
            AppCommand::Reset => {
                self.reset(sink);
                return Ok(());
            }
            AppCommand::TurnOn => self.ctrl.lock(|c| c.borrow_mut().set_level(true, sink)),
            AppCommand::TurnOff => self.ctrl.lock(|c| c.borrow_mut().set_level(false, sink)),
            AppCommand::SetOnTime(ms) => self.ctrl.lock(|c| c.borrow_mut().set_on_time(ms, sink)),
            AppCommand::SetOffTime(ms) => {
                self.ctrl.lock(|c| c.borrow_mut().set_off_time(ms, sink))
            }
        };

        if ok {
            self.cmds.record(true);
            Ok(())
        } else {
            let e = DispatchError::Rejected(op);
            self.reject(e, sink);
            Err(e)
        }
    }

    /// Zero the command counters and event filters.  Controller state
    /// (mapping, pin, level, timing) is left alone.
    pub fn reset(&mut self, sink: &mut impl EventSink) {
        self.cmds.reset_status();
        sink.reset_filters();
        sink.emit(&AppEvent::Reset);
    }

    fn reject(&mut self, e: DispatchError, sink: &mut impl EventSink) {
        warn!("Command rejected: {}", e);
        self.cmds.record(false);
        sink.emit(&AppEvent::InvalidCommand(e));
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of counters and controller state.  Safe at any time,
    /// including when the GPIO is unmapped.
    pub fn build_status(&self) -> StatusSnapshot {
        let blink = self.mode == CtrlMode::Blink;
        self.ctrl.lock(|c| {
            let c = c.borrow();
            StatusSnapshot {
                valid_cmd_count: self.cmds.valid_cmd_count(),
                invalid_cmd_count: self.cmds.invalid_cmd_count(),
                is_mapped: c.is_mapped(),
                out_pin: c.out_pin(),
                led_on: c.led_on(),
                timing: blink.then(|| BlinkTiming {
                    on_time_ms: c.on_time_ms(),
                    off_time_ms: c.off_time_ms(),
                }),
            }
        })
    }
}
