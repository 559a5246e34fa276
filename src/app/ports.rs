//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / LedCtrl (domain)
//! ```
//!
//! Driven adapters (pin hardware, event sinks, the init file) implement
//! these traits.  The domain consumes them via generics, so the controller
//! never touches `/sys` or sockets directly.

use crate::config::AppConfig;
use crate::error::GpioError;

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain → pin hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for a digital output pin.
///
/// All calls are assumed synchronous and fast, with side effects limited
/// to the named pin.
pub trait GpioPort {
    /// Acquire access to the GPIO block.  A failure here is permanent for
    /// the lifetime of the controller; callers never retry.
    fn map(&mut self) -> Result<(), GpioError>;

    /// Configure `pin` as a push-pull output.
    fn configure_output(&mut self, pin: u32) -> Result<(), GpioError>;

    /// Drive `pin` high.
    fn set_high(&mut self, pin: u32) -> Result<(), GpioError>;

    /// Drive `pin` low.
    fn set_low(&mut self, pin: u32) -> Result<(), GpioError>;
}

impl<G: GpioPort + ?Sized> GpioPort for Box<G> {
    fn map(&mut self) -> Result<(), GpioError> {
        (**self).map()
    }

    fn configure_output(&mut self, pin: u32) -> Result<(), GpioError> {
        (**self).configure_output(pin)
    }

    fn set_high(&mut self, pin: u32) -> Result<(), GpioError> {
        (**self).set_high(pin)
    }

    fn set_low(&mut self, pin: u32) -> Result<(), GpioError> {
        (**self).set_low(pin)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Filtering of repeated events is the sink's job,
/// never the controller's.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);

    /// Clear any repeat-suppression state.  Called by the reset command.
    fn reset_filters(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: init file → domain)
// ───────────────────────────────────────────────────────────────

/// Loads the start-up configuration.
pub trait ConfigPort {
    /// Load and validate the configuration.
    fn load(&self) -> Result<AppConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the command pipe)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a schedule fires.
///
/// The composition root implements this by posting a message into the
/// command pipe; the [`Scheduler`](crate::scheduler::Scheduler) itself
/// knows nothing about channels.
pub trait SchedulerDelegate {
    /// Called when the schedule labelled `label` fires.
    fn on_schedule_fired(&mut self, label: &str);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No init file at the configured path.
    NotFound,
    /// The file exists but is not valid JSON for [`AppConfig`].
    Corrupted,
    /// A field failed validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error while reading the file.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
