//! Linux sysfs GPIO adapter.
//!
//! Implements [`GpioPort`] over the legacy `/sys/class/gpio` interface:
//!
//! ```text
//!   <root>/export            ← write "<pin>"
//!   <root>/gpio<pin>/direction ← write "out"
//!   <root>/gpio<pin>/value     ← write "0" | "1"
//! ```
//!
//! The root is configurable so tests (and odd boards) can point it at a
//! different tree.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::GpioPort;
use crate::error::GpioError;

/// udev may still be fixing permissions on a freshly exported pin.
const DIRECTION_RETRIES: u32 = 10;
const DIRECTION_RETRY_DELAY: Duration = Duration::from_millis(10);

/// GPIO access through the sysfs class directory.
pub struct SysfsGpio {
    root: PathBuf,
    mapped: bool,
}

impl SysfsGpio {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mapped: false,
        }
    }

    fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn write_value(&self, pin: u32, level: &str) -> Result<(), GpioError> {
        if !self.mapped {
            return Err(GpioError::NotMapped);
        }
        write_attr(&self.pin_dir(pin).join("value"), level).map_err(|e| {
            debug!("sysfs: value write for GPIO {} failed: {}", pin, e);
            GpioError::WriteFailed(pin)
        })
    }
}

fn write_attr(path: &Path, value: &str) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).truncate(true).open(path)?;
    f.write_all(value.as_bytes())
}

impl GpioPort for SysfsGpio {
    fn map(&mut self) -> Result<(), GpioError> {
        let export = self.root.join("export");
        // Opening for write proves both presence and permission.
        match OpenOptions::new().write(true).open(&export) {
            Ok(_) => {
                self.mapped = true;
                info!("sysfs: GPIO interface at {}", self.root.display());
                Ok(())
            }
            Err(e) => {
                warn!("sysfs: cannot open {}: {}", export.display(), e);
                Err(GpioError::MapFailed)
            }
        }
    }

    fn configure_output(&mut self, pin: u32) -> Result<(), GpioError> {
        if !self.mapped {
            return Err(GpioError::NotMapped);
        }

        let dir = self.pin_dir(pin);
        if !dir.exists() {
            write_attr(&self.root.join("export"), &pin.to_string())
                .map_err(|_| GpioError::ExportFailed(pin))?;
        }

        let direction = dir.join("direction");
        let mut attempt = 0;
        loop {
            match write_attr(&direction, "out") {
                Ok(()) => return Ok(()),
                Err(e) if attempt + 1 < DIRECTION_RETRIES => {
                    debug!("sysfs: GPIO {} direction not ready ({}), retrying", pin, e);
                    attempt += 1;
                    thread::sleep(DIRECTION_RETRY_DELAY);
                }
                Err(_) => return Err(GpioError::DirectionFailed(pin)),
            }
        }
    }

    fn set_high(&mut self, pin: u32) -> Result<(), GpioError> {
        self.write_value(pin, "1")
    }

    fn set_low(&mut self, pin: u32) -> Result<(), GpioError> {
        self.write_value(pin, "0")
    }
}
