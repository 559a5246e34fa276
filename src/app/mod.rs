//! Application core: command contract, dispatch, events, and the service.
//!
//! All interaction with hardware and the outside world happens through
//! the **port traits** in [`ports`], keeping this layer testable without
//! a GPIO block or a bus.

pub mod commands;
pub mod dispatch;
pub mod events;
pub mod ports;
pub mod service;
