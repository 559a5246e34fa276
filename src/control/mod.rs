//! Output control: the LED controller and the blink worker.
//!
//! The controller is reached from two threads in blink mode (command
//! pipe consumer and blink worker), so it lives behind a blocking mutex.
//! Each pin write and its `led_on` update happen inside one `lock` scope.

pub mod blink;
pub mod led;

use core::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::ports::GpioPort;

pub use led::{CtrlParams, LedCtrl};

/// Controller shared between the command pipe and the blink worker.
pub type SharedLedCtrl<G> = Mutex<CriticalSectionRawMutex, RefCell<LedCtrl<G>>>;

/// Wrap a constructed controller for sharing across threads.
pub fn share<G: GpioPort>(ctrl: LedCtrl<G>) -> Arc<SharedLedCtrl<G>> {
    Arc::new(Mutex::new(RefCell::new(ctrl)))
}
