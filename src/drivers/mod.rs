//! Low-level helpers: blocking delay, simulated pin, and thread spawning.

pub mod delay;
pub mod sim_pin;
pub mod task;
