//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no real GPIO
//! required; the bus tests bind a loopback socket.

mod app_service_tests;
mod blink_tests;
mod bus_tests;
mod mock_hw;
