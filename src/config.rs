// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Host configuration.
//!
//! Stored as JSON in `~/.dedhost/config.json`. Every field is optional; a
//! missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cmdline::DEFAULT_MAX_INCLUDE_DEPTH;
use crate::console::DEFAULT_HISTORY_CAPACITY;

/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Console history entries to keep.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Maximum `@file` nesting.
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
    /// Minimum time between status bar refreshes, in milliseconds.
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
    /// Log filter used when `--log-level` is not given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory handed to the engine at init.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}

fn default_status_interval_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_base_dir() -> String {
    ".".to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            max_include_depth: default_max_include_depth(),
            status_interval_ms: default_status_interval_ms(),
            log_level: default_log_level(),
            base_dir: default_base_dir(),
        }
    }
}

impl HostConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match get_config_dir() {
                Some(dir) => dir.join(CONFIG_FILE),
                None => return Ok(Self::default()),
            },
        };

        Self::load_from(&path)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<Self>(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        Ok(config.validated())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    /// Clamp values that would leave the host unusable.
    fn validated(mut self) -> Self {
        if self.history_capacity == 0 {
            tracing::warn!("history_capacity must be at least 1, using 1");
            self.history_capacity = 1;
        }

        if self.max_include_depth == 0 {
            tracing::warn!("max_include_depth must be at least 1, using 1");
            self.max_include_depth = 1;
        }

        if self.base_dir.trim().is_empty() {
            self.base_dir = default_base_dir();
        }

        self
    }
}

/// `~/.dedhost`, if a home directory can be found.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dedhost"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = HostConfig::load_from(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.history_capacity, 255);
        assert_eq!(config.status_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "log_level": "debug", "history_capacity": 0 }"#).unwrap();

        let config = HostConfig::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.max_include_depth, DEFAULT_MAX_INCLUDE_DEPTH);
        assert_eq!(config.base_dir, ".");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        let err = HostConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = HostConfig {
            base_dir: "/srv/hlds".to_string(),
            ..HostConfig::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(HostConfig::load_from(&path).unwrap(), config);
    }
}
