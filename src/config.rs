//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `tempreport.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - SensorConfig: which backend produces raw samples, and where it lives.
//!     - LoggingConfig: diagnostic verbosity (stderr only).
//!
//!     the per-run settings (id, host, port, log path, period, scale) come
//!     from the command line instead, see cli.rs.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct HostConfig {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SensorConfig {
    /// "mock" or "grove"
    pub backend: String,
    /// i2c address of the grove base hat, as a hex string
    pub i2c_address: String,
    pub channel: u8,
    /// raw value the mock backend reports
    pub mock_raw: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            backend: "mock".to_string(),
            i2c_address: "0x04".to_string(),
            channel: 0,
            mock_raw: 511.5,
        }
    }
}

impl SensorConfig {
    #[cfg_attr(not(feature = "hardware"), allow(dead_code))]
    pub fn i2c_address(&self) -> Result<u16> {
        let digits = self
            .i2c_address
            .strip_prefix("0x")
            .or_else(|| self.i2c_address.strip_prefix("0X"))
            .unwrap_or(self.i2c_address.as_str());
        u16::from_str_radix(digits, 16)
            .map_err(|_| ClientError::Config(format!("bad i2c address '{}'", self.i2c_address)))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl HostConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ClientError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ClientError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load with default fallback
    ///
    /// An explicit path must load. Without one, the usual locations are
    /// probed and defaults are used if none of them holds a valid file.
    /// Returns where the config came from, for logging once tracing is up.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, String)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, format!("loaded from {}", path.display())));
        }

        let paths = [
            PathBuf::from("config").join("tempreport.toml"),
            PathBuf::from("..").join("config").join("tempreport.toml"),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => return Ok((config, format!("loaded from {}", path.display()))),
                    Err(e) => eprintln!("[CONFIG] Warning: {}", e),
                }
            }
        }

        Ok((Self::default(), "no config file found - using defaults".to_string()))
    }
}
