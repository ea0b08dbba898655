// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for nr-core operations.

use std::path::PathBuf;

use thiserror::Error;

/// All possible errors that can occur in nr-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid network kind: '{0}'\n  hint: valid kinds are: none, wifi, cellular, ethernet, vpn, bluetooth, other")]
    InvalidNetworkKind(String),

    #[error("invalid cellular grade: '{0}'\n  hint: valid grades are: unknown, 2g, 3g, 3g+, 4g, 5g")]
    InvalidCellularGrade(String),

    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for nr-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
