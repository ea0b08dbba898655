// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the connectivity observer.

/// Error type for observer construction.
///
/// Registration problems are never surfaced here; they are logged and the
/// observer degrades to reporting "disconnected".
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The observer's event loop needs a Tokio runtime to run on.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Result type for observer operations.
pub type ObserverResult<T> = Result<T, ObserverError>;
