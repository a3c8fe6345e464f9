// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! TOML configuration for the slot device.
//!
//! Every key is optional. The active file is the explicit `--config` path,
//! then `SLOTKEEPER_CONFIG`, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;
use slot_apdu::{Codec, CLA, SLOT_COUNT};
use thiserror::Error;

use crate::confirm::ConfirmationGate;
use crate::dispatcher::Dispatcher;
use crate::store::{FileSlotStore, MemorySlotStore, SlotStore, StoreError};

/// Environment variable naming the active configuration file.
pub const CONFIG_ENV: &str = "SLOTKEEPER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `[device]`: class byte and table size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub cla: u8,
    pub slot_count: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            cla: CLA,
            slot_count: SLOT_COUNT,
        }
    }
}

/// `[store]`: where the slot table lives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Image file; the table lives in memory when unset.
    pub path: Option<PathBuf>,
}

/// `[review]`: confirmation screen options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewConfig {
    pub intro_screen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub device: DeviceConfig,
    pub store: StoreConfig,
    pub review: ReviewConfig,
}

impl Config {
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&data)?;
        info!("loaded config {}", path.display());
        Ok(config)
    }

    /// Load the explicit path, else `SLOTKEEPER_CONFIG`, else defaults.
    pub fn load_active(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=255).contains(&self.device.slot_count) {
            return Err(ConfigError::Invalid(format!(
                "device.slot_count must be within 1..=255, got {}",
                self.device.slot_count
            )));
        }
        Ok(())
    }

    pub fn codec(&self) -> Codec {
        Codec::new(self.device.cla)
    }

    pub fn gate(&self) -> ConfirmationGate {
        ConfirmationGate::new(self.review.intro_screen)
    }

    /// Open the configured slot table.
    pub fn open_store(&self) -> Result<Box<dyn SlotStore>, StoreError> {
        Ok(match &self.store.path {
            Some(path) => Box::new(FileSlotStore::open(path, self.device.slot_count)?),
            None => Box::new(MemorySlotStore::new(self.device.slot_count)),
        })
    }

    /// Dispatcher wired to the configured store, class byte and review settings.
    pub fn dispatcher(&self) -> Result<Dispatcher<Box<dyn SlotStore>>, StoreError> {
        Ok(Dispatcher::with_options(
            self.open_store()?,
            self.codec(),
            self.gate(),
        ))
    }
}
