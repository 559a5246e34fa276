//! JSON init-file adapter.
//!
//! Implements [`ConfigPort`] by reading [`AppConfig`] from a JSON file on
//! disk.  Keys absent from the file keep their defaults; unknown keys are
//! ignored so an older binary can read a newer file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::AppConfig;

pub struct IniFile {
    path: PathBuf,
}

impl IniFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file, falling back to defaults when it does not exist.
    ///
    /// Every other failure is returned: a present but unreadable or
    /// invalid file is never silently replaced.
    pub fn load_or_default(&self) -> Result<AppConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => {
                warn!("Init file {} not found, using defaults", self.path.display());
                Ok(AppConfig::default())
            }
            other => other,
        }
    }
}

impl ConfigPort for IniFile {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;

        let config: AppConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Init file {}: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate().map_err(ConfigError::ValidationFailed)?;

        info!("Config loaded from {}", self.path.display());
        Ok(config)
    }
}
