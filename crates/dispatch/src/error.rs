// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

/// Error type for dispatcher construction.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Constructed outside a Tokio runtime.
    #[error("no tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// Rejected replay configuration.
    #[error(transparent)]
    Config(#[from] nr_core::Error),
}

/// Result type for dispatcher construction.
pub type DispatchResult<T> = Result<T, DispatchError>;
