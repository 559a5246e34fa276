//! Outbound application events.
//!
//! The controller and the [`AppService`](super::service::AppService) emit
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them: log to the console,
//! forward to a ground link, etc.

use serde::{Deserialize, Serialize};

use super::dispatch::DispatchError;

/// Numeric event identifier, stable across releases.
pub type EventId = u16;

const APP_BASE_EID: EventId = 0;
const CTRL_BASE_EID: EventId = 20;

pub const INIT_APP_EID: EventId = APP_BASE_EID;
pub const NOOP_EID: EventId = APP_BASE_EID + 1;
pub const RESET_EID: EventId = APP_BASE_EID + 2;
pub const INVALID_CMD_EID: EventId = APP_BASE_EID + 3;
pub const TELEMETRY_EID: EventId = APP_BASE_EID + 4;

pub const CTRL_MAP_EID: EventId = CTRL_BASE_EID;
pub const CTRL_LEVEL_EID: EventId = CTRL_BASE_EID + 1;
pub const CTRL_ON_TIME_EID: EventId = CTRL_BASE_EID + 2;
pub const CTRL_OFF_TIME_EID: EventId = CTRL_BASE_EID + 3;
pub const CTRL_BLINK_EID: EventId = CTRL_BASE_EID + 4;
pub const CTRL_WORKER_EID: EventId = CTRL_BASE_EID + 5;

/// Event class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Error,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service finished start-up.
    Started { version: &'static str },

    /// A no-op command was received.
    Noop { version: &'static str },

    /// Counters and event filters were reset.
    Reset,

    /// A command was rejected at the dispatch boundary.
    InvalidCommand(DispatchError),

    /// GPIO mapping failed during construction; the pin is inert.
    MapFailed,

    /// The output pin was driven by a direct command.
    LevelChanged { pin: u32, on: bool },

    /// Blink on time changed.
    OnTimeSet(u32),

    /// Blink off time changed.
    OffTimeSet(u32),

    /// The blink worker entered a phase and will hold it for `hold_ms`.
    BlinkPhase { pin: u32, on: bool, hold_ms: u32 },

    /// The blink worker exited.
    WorkerStopped,

    /// Periodic status snapshot.
    Telemetry(StatusSnapshot),
}

impl AppEvent {
    pub fn id(&self) -> EventId {
        match self {
            Self::Started { .. } => INIT_APP_EID,
            Self::Noop { .. } => NOOP_EID,
            Self::Reset => RESET_EID,
            Self::InvalidCommand(_) => INVALID_CMD_EID,
            Self::Telemetry(_) => TELEMETRY_EID,
            Self::MapFailed => CTRL_MAP_EID,
            Self::LevelChanged { .. } => CTRL_LEVEL_EID,
            Self::OnTimeSet(_) => CTRL_ON_TIME_EID,
            Self::OffTimeSet(_) => CTRL_OFF_TIME_EID,
            Self::BlinkPhase { .. } => CTRL_BLINK_EID,
            Self::WorkerStopped => CTRL_WORKER_EID,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidCommand(_) | Self::MapFailed | Self::WorkerStopped => Severity::Error,
            Self::Telemetry(_) => Severity::Debug,
            _ => Severity::Info,
        }
    }
}

/// Blink timing, present in snapshots only in blink mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkTiming {
    pub on_time_ms: u32,
    pub off_time_ms: u32,
}

/// A point-in-time status snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub valid_cmd_count: u16,
    pub invalid_cmd_count: u16,
    pub is_mapped: bool,
    pub out_pin: u32,
    pub led_on: bool,
    pub timing: Option<BlinkTiming>,
}
