// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Refresh subscribers.
//!
//! The registry holds subscribers weakly: registering never extends a
//! subscriber's lifetime, and dropped subscribers are purged whenever the
//! registry is traversed.

use std::sync::{Arc, Weak};

/// Notified once after each settled reconnect.
pub trait RefreshSubscriber: Send + Sync {
    fn on_refresh_requested(&self);
}

#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    entries: Vec<Weak<dyn RefreshSubscriber>>,
}

impl SubscriberRegistry {
    /// Returns false if the subscriber was already registered.
    pub(crate) fn add(&mut self, subscriber: Weak<dyn RefreshSubscriber>) -> bool {
        self.purge();
        if self.entries.iter().any(|w| w.ptr_eq(&subscriber)) {
            return false;
        }
        self.entries.push(subscriber);
        true
    }

    pub(crate) fn remove(&mut self, subscriber: &Weak<dyn RefreshSubscriber>) {
        self.entries
            .retain(|w| w.strong_count() > 0 && !w.ptr_eq(subscriber));
    }

    /// Upgrades every live subscriber, dropping the dead ones.
    pub(crate) fn live(&mut self) -> Vec<Arc<dyn RefreshSubscriber>> {
        let mut live = Vec::with_capacity(self.entries.len());
        self.entries.retain(|w| match w.upgrade() {
            Some(subscriber) => {
                live.push(subscriber);
                true
            }
            None => false,
        });
        live
    }

    pub(crate) fn live_count(&mut self) -> usize {
        self.purge();
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    fn purge(&mut self) {
        self.entries.retain(|w| w.strong_count() > 0);
    }
}

#[cfg(test)]
#[path = "subscribers_tests.rs"]
mod tests;
