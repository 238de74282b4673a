//! # Configuration
//!
//! Settings live in `config.json` inside the data directory. A missing file
//! means defaults; unknown keys are ignored and missing keys take their
//! default, so older files keep loading.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `id_policy` | `next-after-max` | How new ids are numbered (`next-after-max` or `row-count`) |
//! | `lock_timeout_ms` | `10000` | Max wait for a table lock; `null` waits forever |
//! | `sync_directory` | `true` | fsync the data directory after each rename |
//! | `default_meter_units` | `["km", "miles", "hours", "cycles"]` | Seed for the meter-unit registry |
//!
//! ## Data Directory
//!
//! The CLI resolves the data directory from `--data-dir`, then the
//! `UPKEEP_DATA_DIR` environment variable, then the platform data directory.

use crate::error::{Result, UpkeepError};
use crate::ids::IdPolicy;
use crate::store::atomic;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 10_000;

fn default_lock_timeout() -> Option<u64> {
    Some(DEFAULT_LOCK_TIMEOUT_MS)
}

fn default_true() -> bool {
    true
}

fn default_meter_units() -> Vec<String> {
    vec![
        "km".to_string(),
        "miles".to_string(),
        "hours".to_string(),
        "cycles".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpkeepConfig {
    #[serde(default)]
    pub id_policy: IdPolicy,

    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: Option<u64>,

    #[serde(default = "default_true")]
    pub sync_directory: bool,

    #[serde(default = "default_meter_units")]
    pub default_meter_units: Vec<String>,
}

impl Default for UpkeepConfig {
    fn default() -> Self {
        Self {
            id_policy: IdPolicy::default(),
            lock_timeout_ms: default_lock_timeout(),
            sync_directory: true,
            default_meter_units: default_meter_units(),
        }
    }
}

impl UpkeepConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: UpkeepConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        atomic::write_bytes(&config_path, content.as_bytes(), self.sync_directory)
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    pub const KEYS: &'static [&'static str] = &[
        "id_policy",
        "lock_timeout_ms",
        "sync_directory",
        "default_meter_units",
    ];

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "id_policy" => self.id_policy.to_string(),
            "lock_timeout_ms" => self
                .lock_timeout_ms
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| "none".to_string()),
            "sync_directory" => self.sync_directory.to_string(),
            "default_meter_units" => self.default_meter_units.join(","),
            other => return Err(unknown_key(other)),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "id_policy" => {
                self.id_policy = value.parse().map_err(UpkeepError::Validation)?;
            }
            "lock_timeout_ms" => {
                self.lock_timeout_ms = match value.trim() {
                    "none" | "null" | "" => None,
                    v => Some(v.parse().map_err(|_| {
                        UpkeepError::validation(format!("'{}' is not a number of milliseconds", v))
                    })?),
                };
            }
            "sync_directory" => {
                self.sync_directory = value.trim().parse().map_err(|_| {
                    UpkeepError::validation(format!("'{}' is not true or false", value))
                })?;
            }
            "default_meter_units" => {
                self.default_meter_units = value
                    .split(',')
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> UpkeepError {
    UpkeepError::validation(format!(
        "Unknown config key '{}' (known: {})",
        key,
        UpkeepConfig::KEYS.join(", ")
    ))
}
