// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replay dispatcher.
//!
//! Callers hand the dispatcher an id and a re-invocable action when an
//! operation fails for lack of network. When the connectivity observer
//! reports that the network is back, the dispatcher waits for the
//! connection to settle, replays the pending actions one stagger apart, and
//! then asks every live refresh subscriber to refresh.
//!
//! ```text
//! ConnectivityObserver ──on_available──► settle ──► drain ──► actions (staggered)
//!                                                     │
//!                                                     └──► refresh subscribers
//! ```
//!
//! # Retry policy
//!
//! An id may be queued at most `max_retries` times. Each re-submission, by
//! the caller or by the dispatcher after a failed replay, counts as one more
//! attempt; the submission past the ceiling drops the id.

mod action;
mod dispatcher;
mod error;
mod subscribers;
mod table;

pub use action::{ActionError, ActionFuture, ActionResult, ReplayAction};
pub use dispatcher::ReplayDispatcher;
pub use error::{DispatchError, DispatchResult};
pub use subscribers::RefreshSubscriber;

#[cfg(test)]
mod test_helpers;
