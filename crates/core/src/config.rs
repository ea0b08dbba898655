// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replay and observer configuration.
//!
//! Configuration is read from `netreplay/config.toml` under the user's config
//! directory. Every field is optional; a missing file yields the defaults:
//!
//! ```toml
//! [replay]
//! max_retries = 3
//! stagger_ms = 250
//! settle_ms = 500
//! grace_multiple = 4
//! # max_pending = 500
//!
//! [observer]
//! prefer_callbacks = true
//! poll_interval_ms = 2000
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "netreplay";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub replay: ReplayConfig,
    pub observer: ObserverConfig,
}

/// Retry and drain pacing for the replay dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Attempts allowed per action id before it is abandoned (default: 3).
    pub max_retries: u32,
    /// Delay between successive invocations within one drain (default: 250).
    pub stagger_ms: u64,
    /// Wait after a reconnect before draining (default: 500).
    pub settle_ms: u64,
    /// The single-flight guard is released `stagger_ms * grace_multiple`
    /// after a drain starts (default: 4).
    pub grace_multiple: u32,
    /// Optional cap on distinct pending ids. Unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pending: Option<usize>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            max_retries: 3,
            stagger_ms: 250,
            settle_ms: 500,
            grace_multiple: 4,
            max_pending: None,
        }
    }
}

impl ReplayConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// How long the single-flight guard stays closed after a drain starts.
    pub fn grace(&self) -> Duration {
        self.stagger().saturating_mul(self.grace_multiple)
    }

    /// Rejects values that would disable retrying or the single-flight guard.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::InvalidConfig {
                field: "max_retries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.grace_multiple == 0 {
            return Err(Error::InvalidConfig {
                field: "grace_multiple",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_pending == Some(0) {
            return Err(Error::InvalidConfig {
                field: "max_pending",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }
}

/// Detection strategy selection for the connectivity observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Use per-network callbacks when the platform supports them (default: true).
    pub prefer_callbacks: bool,
    /// Poll cadence for platforms without change notifications (default: 2000).
    pub poll_interval_ms: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        ObserverConfig {
            prefer_callbacks: true,
            poll_interval_ms: 2_000,
        }
    }
}

impl ObserverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults if the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.replay.validate()?;
        Ok(config)
    }

    /// Loads from the default location.
    pub fn load_default() -> Result<Self> {
        match default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Config::default()),
        }
    }
}

/// `<config dir>/netreplay/config.toml`, if the platform has a config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
