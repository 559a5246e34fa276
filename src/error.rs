//! Error types shared by the adapters and the application core.
//!
//! Every variant is `Copy` so errors can be passed through the controller
//! and the bus layer without allocation.  The controller itself has no
//! validation tier: these errors only describe hardware and transport
//! failures.

use core::fmt;

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`GpioPort`](crate::app::ports::GpioPort) adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The platform GPIO interface could not be acquired.  Usually a
    /// permissions problem or a platform mismatch in the mapping setup.
    MapFailed,
    /// An operation was attempted before `map()` succeeded.
    NotMapped,
    /// The pin could not be exported / claimed.
    ExportFailed(u32),
    /// The pin could not be switched to output mode.
    DirectionFailed(u32),
    /// Writing the output level failed.
    WriteFailed(u32),
    /// The adapter does not drive the requested pin.
    UnknownPin(u32),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapFailed => write!(f, "GPIO map failed"),
            Self::NotMapped => write!(f, "GPIO not mapped"),
            Self::ExportFailed(pin) => write!(f, "GPIO {pin} export failed"),
            Self::DirectionFailed(pin) => write!(f, "GPIO {pin} direction config failed"),
            Self::WriteFailed(pin) => write!(f, "GPIO {pin} write failed"),
            Self::UnknownPin(pin) => write!(f, "GPIO {pin} not handled by this adapter"),
        }
    }
}

impl std::error::Error for GpioError {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Failures reported by the command/telemetry bus transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The listening socket could not be created.
    BindFailed,
    /// The addressed client slot has no live connection.
    NotConnected,
    /// Reading from a client failed.
    ReadFailed,
    /// Writing to a client failed.
    WriteFailed,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindFailed => write!(f, "bus bind failed"),
            Self::NotConnected => write!(f, "bus client not connected"),
            Self::ReadFailed => write!(f, "bus read failed"),
            Self::WriteFailed => write!(f, "bus write failed"),
        }
    }
}

impl std::error::Error for BusError {}
