//! Periodic trigger scheduler.
//!
//! Drives the status telemetry cadence.  The scheduler notifies a
//! [`SchedulerDelegate`] when a schedule fires; the composition root
//! implements the delegate to post into the command pipe.
//!
//! ```text
//!   sched thread ──tick(elapsed)──▶ Scheduler ──▶ SchedulerDelegate
//!                                                  │
//!                                                  ▼
//!                                     PIPE ◀── PipeMsg::SendStatus
//! ```
//!
//! Elapsed time is passed in by the caller, so the engine is testable
//! without a clock.  Overshoot carries over to the next period, keeping
//! the long-run rate at one fire per interval.

use std::io;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::info;

use crate::app::ports::SchedulerDelegate;
use crate::drivers::task;

/// Maximum number of concurrent schedules.
const MAX_SCHEDULES: usize = 4;

/// Default tick period of the scheduler thread.
pub const TICK_PERIOD: Duration = Duration::from_millis(10);

/// A single periodic schedule.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Label passed to the delegate (e.g. "status").
    pub label: &'static str,
    /// Fire every `interval_ms` milliseconds.
    pub interval_ms: u32,
}

#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    elapsed_ms: u64,
}

pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
        }
    }

    /// Add a schedule.  Returns the slot index, or `None` if full or the
    /// interval is zero.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        if schedule.interval_ms == 0 {
            return None;
        }
        let (i, slot) = self
            .schedules
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.is_none())?;
        info!(
            "Scheduler: added '{}' every {}ms at slot {}",
            schedule.label, schedule.interval_ms, i
        );
        *slot = Some(ScheduleEntry {
            schedule,
            elapsed_ms: 0,
        });
        Some(i)
    }

    /// Advance every schedule by `elapsed_ms` and fire those that are due.
    ///
    /// A schedule fires at most once per tick; a tick longer than several
    /// intervals does not produce a burst.
    pub fn tick(&mut self, elapsed_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.schedules.iter_mut().flatten() {
            let interval = u64::from(entry.schedule.interval_ms);
            entry.elapsed_ms += elapsed_ms;
            if entry.elapsed_ms >= interval {
                delegate.on_schedule_fired(entry.schedule.label);
                entry.elapsed_ms = (entry.elapsed_ms - interval).min(interval - 1);
            }
        }
    }
}

/// Whole milliseconds from `*last` to `now`.  `*last` advances by exactly
/// that much, so the sub-millisecond remainder counts toward the next tick.
fn take_whole_ms(last: &mut Instant, now: Instant) -> u64 {
    let ms = now.saturating_duration_since(*last).as_millis() as u64;
    *last += Duration::from_millis(ms);
    ms
}

/// Tick `scheduler` every `period` on a dedicated thread, measuring real
/// elapsed time between ticks.
pub fn spawn<D>(mut scheduler: Scheduler, mut delegate: D, period: Duration) -> io::Result<JoinHandle<()>>
where
    D: SchedulerDelegate + Send + 'static,
{
    task::spawn_named("sched", 16, move || {
        let mut last = Instant::now();
        loop {
            std::thread::sleep(period);
            let elapsed = take_whole_ms(&mut last, Instant::now());
            scheduler.tick(elapsed, &mut delegate);
        }
    })
}
