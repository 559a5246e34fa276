//! Message-driven GPIO output controller.
//!
//! Receives commands over a framed TCP bus, drives a single output pin
//! either directly (turn on / turn off) or through an autonomous blink
//! worker, and publishes periodic status telemetry.  Hardware access,
//! event reporting, and configuration all sit behind port traits in
//! [`app::ports`], so everything except the binary's composition root is
//! testable on a development host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bus;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod scheduler;
