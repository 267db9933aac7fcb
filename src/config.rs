//! Configuration for minitel.
//!
//! Settings are read from `~/.minitel/config.toml`. Every field has a
//! default, so the file and each of its sections are optional:
//!
//! ```toml
//! # "serial" for a real terminal, "console" to emulate one locally
//! transport = "serial"
//!
//! # tracing filter, overridden by RUST_LOG
//! log_level = "info"
//!
//! # First screen shown
//! start_route = "index"
//!
//! [serial]
//! path = "/dev/ttyUSB0"
//! baud_rate = 1200
//!
//! [input]
//! # Key outside the accepted set during single-key capture:
//! # "beep" keeps reading, "reject" ends the read with an error
//! stray_key = "beep"
//! ```

use std::fs;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::input::StrayKeyPolicy;
use crate::transport::serial::DEFAULT_BAUD_RATE;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which transport to open
    pub transport: TransportKind,
    /// Tracing filter directive
    pub log_level: String,
    /// Route shown first, and after SOMMAIRE
    pub start_route: String,
    /// Serial line settings
    pub serial: SerialConfig,
    /// Input behavior
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: TransportKind::Serial,
            log_level: "info".to_string(),
            start_route: "index".to_string(),
            serial: SerialConfig::default(),
            input: InputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Serial,
    Console,
}

/// Serial line configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub path: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub stray_key: StrayKeyPolicy,
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = Self::parse(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Directory holding the config file and the log
    pub fn get_config_dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".minitel"))
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|dir| dir.join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
