// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity listeners and transition classification.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use nr_core::ConnectivityState;

/// Receives connectivity transitions from a [`ConnectivityObserver`].
///
/// All callbacks are invoked from the observer's event loop, one at a time,
/// so implementations need no locking of their own for ordering.
///
/// [`ConnectivityObserver`]: crate::ConnectivityObserver
pub trait ConnectivityListener: Send + Sync {
    /// The device went from not connected to connected.
    fn on_available(&self, state: &ConnectivityState);

    /// The device went from connected to not connected.
    fn on_lost(&self);

    /// Still connected, but some detail of the connection changed.
    fn on_capabilities_changed(&self, _state: &ConnectivityState) {}
}

/// A discrete change between two successive states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Available(ConnectivityState),
    Lost,
    CapabilitiesChanged(ConnectivityState),
}

impl Transition {
    /// Classifies the move from `prev` to `next`.
    ///
    /// Availability is edge-triggered on `connected`; any other difference
    /// while connected is a capabilities change.
    pub fn between(prev: &ConnectivityState, next: &ConnectivityState) -> Option<Transition> {
        match (prev.connected, next.connected) {
            (false, true) => Some(Transition::Available(*next)),
            (true, false) => Some(Transition::Lost),
            (true, true) if prev != next => Some(Transition::CapabilitiesChanged(*next)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transition::Available(_) => "available",
            Transition::Lost => "lost",
            Transition::CapabilitiesChanged(_) => "capabilities-changed",
        }
    }
}

/// Ordered set of listeners, owned by the event loop.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<Arc<dyn ConnectivityListener>>,
}

impl ListenerSet {
    /// Adds a listener. Adding the same listener twice is a no-op.
    pub(crate) fn add(&mut self, listener: Arc<dyn ConnectivityListener>) {
        if !self.listeners.iter().any(|l| same_listener(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    pub(crate) fn remove(&mut self, listener: &Arc<dyn ConnectivityListener>) {
        self.listeners.retain(|l| !same_listener(l, listener));
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Delivers `transition` to every listener in registration order.
    ///
    /// A panicking listener is logged and skipped.
    pub(crate) fn dispatch(&self, transition: &Transition) {
        for listener in &self.listeners {
            let delivered = catch_unwind(AssertUnwindSafe(|| match transition {
                Transition::Available(state) => listener.on_available(state),
                Transition::Lost => listener.on_lost(),
                Transition::CapabilitiesChanged(state) => listener.on_capabilities_changed(state),
            }));
            if delivered.is_err() {
                tracing::warn!("connectivity listener panicked during {}", transition.name());
            }
        }
    }
}

fn same_listener(a: &Arc<dyn ConnectivityListener>, b: &Arc<dyn ConnectivityListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
