//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events through the
//! `log` facade, one line per event tagged with its numeric id.  The
//! binary installs the backend; library code never does.
//!
//! Repeated events are throttled by a binary filter table.  An event
//! registered with mask `m` is delivered while `count & m == 0`, and its
//! counter saturates at `u16::MAX`:
//!
//! | Mask              | Delivered            |
//! |-------------------|----------------------|
//! | [`NO_FILTER`]     | always               |
//! | [`FIRST_ONE_STOP`]| first occurrence     |
//! | [`FIRST_4_STOP`]  | first four           |
//! | [`EVERY_OTHER_ONE`]| every second one    |
//!
//! Clones share the filter table, so the command pipe and the blink
//! worker count against the same budget and one reset clears both.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use log::{debug, error, info};

use crate::app::events::{AppEvent, CTRL_BLINK_EID, EventId, Severity};
use crate::app::ports::EventSink;

pub const NO_FILTER: u16 = 0x0000;
pub const FIRST_ONE_STOP: u16 = 0xFFFF;
pub const FIRST_4_STOP: u16 = 0xFFFC;
pub const EVERY_OTHER_ONE: u16 = 0x0001;

/// Filter table capacity.
pub const MAX_FILTERS: usize = 8;

struct FilterEntry {
    id: EventId,
    mask: u16,
    count: AtomicU16,
}

/// Per-event-id binary filters.
#[derive(Default)]
pub struct EventFilter {
    entries: heapless::Vec<FilterEntry, MAX_FILTERS>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) `id` with `mask`.  Returns `false` when
    /// the table is full.
    pub fn register(&mut self, id: EventId, mask: u16) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.mask = mask;
            entry.count.store(0, Ordering::Relaxed);
            return true;
        }
        self.entries
            .push(FilterEntry {
                id,
                mask,
                count: AtomicU16::new(0),
            })
            .is_ok()
    }

    /// Count one occurrence of `id` and say whether to deliver it.
    /// Unregistered ids always pass.
    pub fn admit(&self, id: EventId) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return true;
        };
        let prev = entry
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some(c.saturating_add(1)))
            .unwrap_or(u16::MAX);
        prev & entry.mask == 0
    }

    /// Times `id` has been seen since the last reset.
    pub fn count(&self, id: EventId) -> Option<u16> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.count.load(Ordering::Acquire))
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for entry in &self.entries {
            entry.count.store(0, Ordering::Release);
        }
    }
}

/// Adapter that logs every admitted [`AppEvent`].
#[derive(Clone)]
pub struct LogEventSink {
    app_name: Arc<str>,
    filter: Arc<EventFilter>,
}

impl LogEventSink {
    /// Sink with the default filter table (blink phases: first four).
    pub fn new(app_name: &str) -> Self {
        let mut filter = EventFilter::new();
        filter.register(CTRL_BLINK_EID, FIRST_4_STOP);
        Self::with_filter(app_name, filter)
    }

    pub fn with_filter(app_name: &str, filter: EventFilter) -> Self {
        Self {
            app_name: app_name.into(),
            filter: Arc::new(filter),
        }
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let id = event.id();
        if !self.filter.admit(id) {
            return;
        }
        let line = Line {
            app: &self.app_name,
            event,
        };
        match event.severity() {
            Severity::Debug => debug!("{}", line),
            Severity::Info => info!("{}", line),
            Severity::Error => error!("{}", line),
        }
    }

    fn reset_filters(&mut self) {
        self.filter.reset();
        info!("{}: event filters reset", self.app_name);
    }
}

/// One rendered log line.
struct Line<'a> {
    app: &'a str,
    event: &'a AppEvent,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] ", self.app, self.event.id())?;
        match self.event {
            AppEvent::Started { version } => write!(f, "App initialized. Version {}", version),
            AppEvent::Noop { version } => write!(f, "No-op command. Version {}", version),
            AppEvent::Reset => write!(f, "Reset counters command"),
            AppEvent::InvalidCommand(e) => write!(f, "Invalid command: {}", e),
            AppEvent::MapFailed => write!(
                f,
                "GPIO map failed. Verify the platform GPIO setting and that the \
                 process runs with elevated privileges"
            ),
            AppEvent::LevelChanged { pin, on } => {
                write!(f, "GPIO pin {} turned {}", pin, if *on { "on" } else { "off" })
            }
            AppEvent::OnTimeSet(ms) => write!(f, "GPIO on time set to {} milliseconds", ms),
            AppEvent::OffTimeSet(ms) => write!(f, "GPIO off time set to {} milliseconds", ms),
            AppEvent::BlinkPhase { pin, on, hold_ms } => write!(
                f,
                "GPIO pin {} {} for {} milliseconds",
                pin,
                if *on { "on" } else { "off" },
                hold_ms
            ),
            AppEvent::WorkerStopped => write!(f, "Blink worker exited"),
            AppEvent::Telemetry(s) => write!(
                f,
                "TELEM | valid={} invalid={} | mapped={} pin={} on={} | timing={:?}",
                s.valid_cmd_count, s.invalid_cmd_count, s.is_mapped, s.out_pin, s.led_on, s.timing
            ),
        }
    }
}
