// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replayable actions.
//!
//! An action is an opaque, re-invocable operation supplied by a caller. The
//! dispatcher only learns whether one invocation succeeded.

use std::future::Future;
use std::pin::Pin;

/// Error type for a failed action invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The network was unreachable while the action ran.
    #[error("network unavailable")]
    Offline,

    /// The action ran and failed.
    #[error("action failed: {0}")]
    Failed(String),

    /// The action panicked.
    #[error("action panicked")]
    Panicked,
}

/// Result of one invocation.
pub type ActionResult = Result<(), ActionError>;

/// Future returned by [`ReplayAction::invoke`].
pub type ActionFuture = Pin<Box<dyn Future<Output = ActionResult> + Send>>;

/// A zero-argument operation the dispatcher may invoke again later.
///
/// Implemented for any `Fn() -> impl Future<Output = ActionResult>`, so an
/// async closure can be passed directly.
pub trait ReplayAction: Send + Sync + 'static {
    fn invoke(&self) -> ActionFuture;
}

impl<F, Fut> ReplayAction for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    fn invoke(&self) -> ActionFuture {
        Box::pin(self())
    }
}
