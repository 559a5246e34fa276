//! Application configuration parameters.
//!
//! Every value is resolved once at start-up from the JSON init file (see
//! [`IniFile`](crate::adapters::ini_file::IniFile)) before the controller
//! is constructed.  Keys missing from the file keep their defaults.

use serde::{Deserialize, Serialize};

/// Init file read when no `--config` path is given.
pub const DEFAULT_INI_PATH: &str = "/cf/rpi_led_ini.json";

/// Which command set the controller exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtrlMode {
    /// Turn-on / turn-off commands drive the pin directly.
    Direct,
    /// A worker thread blinks the pin; commands tune the on/off times.
    Blink,
}

/// Where pin writes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpioBackend {
    /// Linux `/sys/class/gpio` interface.
    Sysfs,
    /// In-memory pin, for development hosts.
    Sim,
}

/// Core application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // --- Application ---
    /// Name used in start-up and exit log lines.
    pub app_name: String,
    /// Command set exposed on the bus.
    pub ctrl_mode: CtrlMode,

    // --- Controller ---
    /// BCM number of the output pin.
    pub ctrl_out_pin: u32,
    /// Initial blink on time (milliseconds).  Not range checked.
    pub ctrl_on_time_ms: u32,
    /// Initial blink off time (milliseconds).  Not range checked.
    pub ctrl_off_time_ms: u32,

    // --- Telemetry ---
    /// Status telemetry period (milliseconds).
    pub status_interval_ms: u32,

    // --- Blink worker ---
    /// Thread name of the blink worker.
    pub child_name: String,
    /// Stack size of the blink worker (KiB).
    pub child_stack_kb: u32,

    // --- Hardware ---
    pub gpio_backend: GpioBackend,
    /// Root of the sysfs GPIO class directory.
    pub sysfs_root: String,

    // --- Bus ---
    /// TCP address the command/telemetry bus listens on.
    pub bus_listen_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "RPI_LED".into(),
            ctrl_mode: CtrlMode::Direct,

            ctrl_out_pin: 17,
            ctrl_on_time_ms: 500,
            ctrl_off_time_ms: 500,

            status_interval_ms: 1000, // 1 Hz

            child_name: "led-blink".into(),
            child_stack_kb: 16,

            gpio_backend: GpioBackend::Sysfs,
            sysfs_root: "/sys/class/gpio".into(),

            bus_listen_addr: "127.0.0.1:5010".into(),
        }
    }
}

impl AppConfig {
    /// Check the few values the runtime cannot work without.
    ///
    /// On/off times are not checked: any value is accepted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.status_interval_ms == 0 {
            return Err("status_interval_ms must be non-zero");
        }
        if self.bus_listen_addr.trim().is_empty() {
            return Err("bus_listen_addr must not be empty");
        }
        Ok(())
    }
}
