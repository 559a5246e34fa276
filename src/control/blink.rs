//! Blink worker.
//!
//! One call to [`run_cycle`] is one full on/off cycle:
//!
//! ```text
//!   lock ─▶ drive high ─▶ unlock ─▶ delay(on_time_ms)
//!   lock ─▶ drive low  ─▶ unlock ─▶ delay(off_time_ms)
//! ```
//!
//! Each phase reads its duration when the phase starts.  A duration
//! command that lands during the on wait therefore shapes the following
//! off phase, never the wait already in progress.  There is no mid-wait
//! cancellation.

use std::sync::Arc;
use std::thread::JoinHandle;

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort};
use crate::drivers::task;

use super::SharedLedCtrl;

/// Whether the worker should run another cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Stop,
}

/// Run one blink cycle.  Returns [`StepOutcome::Stop`] only when the
/// controller is unmapped; nothing is written to the pin in that case.
pub fn run_cycle<G, S, D>(ctrl: &SharedLedCtrl<G>, sink: &mut S, delay: &mut D) -> StepOutcome
where
    G: GpioPort,
    S: EventSink,
    D: DelayNs,
{
    let Some(on_ms) = ctrl.lock(|c| c.borrow_mut().enter_on_phase(sink)) else {
        return StepOutcome::Stop;
    };
    delay.delay_ms(on_ms);

    let Some(off_ms) = ctrl.lock(|c| c.borrow_mut().enter_off_phase(sink)) else {
        return StepOutcome::Stop;
    };
    delay.delay_ms(off_ms);

    StepOutcome::Continue
}

/// Run cycles until one reports [`StepOutcome::Stop`].
pub fn run_worker<G, S, D>(ctrl: &SharedLedCtrl<G>, sink: &mut S, delay: &mut D)
where
    G: GpioPort,
    S: EventSink,
    D: DelayNs,
{
    while run_cycle(ctrl, sink, delay) == StepOutcome::Continue {}
    sink.emit(&AppEvent::WorkerStopped);
}

/// Spawn the blink worker on its own named thread.
pub fn spawn<G, S, D>(
    name: &str,
    stack_kb: usize,
    ctrl: Arc<SharedLedCtrl<G>>,
    mut sink: S,
    mut delay: D,
) -> std::io::Result<JoinHandle<()>>
where
    G: GpioPort + Send + 'static,
    S: EventSink + Send + 'static,
    D: DelayNs + Send + 'static,
{
    info!("Starting blink worker '{}'", name);
    task::spawn_named(name, stack_kb, move || run_worker(&ctrl, &mut sink, &mut delay))
}
