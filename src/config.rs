//! Configuration management for w3mimg.
//!
//! This module provides TOML configuration file loading from
//! `~/.w3mimg/config.toml`.
//!
//! # Configuration File
//!
//! ```toml
//! # Full path to the helper executable (optional).
//! # Defaults to "w3mimgdisplay"; on Linux the binary usually lives at
//! # /usr/lib/w3m/w3mimgdisplay.
//! helper = "/usr/lib/w3m/w3mimgdisplay"
//!
//! # Follow every draw/redraw with a drawing sync command
//! auto_sync = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::session::DEFAULT_HELPER;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Helper executable path
    pub helper: Option<String>,
    /// Follow every draw/redraw with a drawing sync command
    pub auto_sync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            helper: None,
            auto_sync: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), String> {
        if let Some(path) = Self::get_config_path() {
            let content = toml::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
            Ok(())
        } else {
            Err("Could not determine config path".to_string())
        }
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let dir = home.join(".w3mimg");
            if !dir.exists() {
                let _ = fs::create_dir_all(&dir);
            }
            return Some(dir.join("config.toml"));
        }
        None
    }

    /// Helper executable path, falling back to the default name
    pub fn helper_path(&self) -> &str {
        self.helper.as_deref().unwrap_or(DEFAULT_HELPER)
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
