// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory platform for tests and demos.
//!
//! [`SimulatedPlatform`] holds a scripted default network and airplane flag and
//! notifies registered callbacks the way a real platform would when either
//! changes. Callbacks run on the thread that made the change, outside any lock.

use std::collections::HashMap;
use std::sync::Mutex;

use nr_core::Capabilities;

use crate::platform::{
    AirplaneCallback, NetworkCallback, NetworkPlatform, NetworkSignal, PlatformError,
    PlatformResult, ReceiverCallback, Registration,
};

#[derive(Default)]
struct Inner {
    network: Option<Capabilities>,
    airplane: bool,
    supports_callbacks: bool,
    deny_callbacks: bool,
    deny_receivers: bool,
    next_id: u64,
    network_callbacks: HashMap<u64, NetworkCallback>,
    receivers: HashMap<u64, ReceiverCallback>,
    airplane_receivers: HashMap<u64, AirplaneCallback>,
}

impl Inner {
    fn next_registration(&mut self) -> Registration {
        self.next_id += 1;
        Registration(self.next_id)
    }
}

/// A scripted [`NetworkPlatform`].
pub struct SimulatedPlatform {
    inner: Mutex<Inner>,
}

impl SimulatedPlatform {
    /// A platform with per-network callback support and no network.
    pub fn new() -> Self {
        SimulatedPlatform {
            inner: Mutex::new(Inner {
                supports_callbacks: true,
                ..Inner::default()
            }),
        }
    }

    /// A platform that only offers connectivity broadcasts.
    pub fn legacy() -> Self {
        SimulatedPlatform {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes network-callback registration fail with a permission error.
    pub fn deny_network_callbacks(&self, deny: bool) {
        self.lock().deny_callbacks = deny;
    }

    /// Makes broadcast-receiver registration fail with a permission error.
    pub fn deny_receivers(&self, deny: bool) {
        self.lock().deny_receivers = deny;
    }

    /// Replaces the default network and notifies callbacks and receivers.
    pub fn set_network(&self, network: Option<Capabilities>) {
        let (previous, callbacks, receivers) = {
            let mut inner = self.lock();
            let previous = std::mem::replace(&mut inner.network, network);
            let callbacks: Vec<NetworkCallback> = inner.network_callbacks.values().cloned().collect();
            let receivers: Vec<ReceiverCallback> = inner.receivers.values().cloned().collect();
            (previous, callbacks, receivers)
        };

        for callback in &callbacks {
            match (previous, network) {
                (None, Some(caps)) => {
                    callback(NetworkSignal::Available);
                    callback(NetworkSignal::CapabilitiesChanged(caps));
                }
                (Some(_), Some(caps)) => callback(NetworkSignal::CapabilitiesChanged(caps)),
                (Some(_), None) => callback(NetworkSignal::Lost),
                (None, None) => {}
            }
        }
        for receiver in &receivers {
            receiver();
        }
    }

    /// Flips airplane mode and notifies airplane receivers.
    ///
    /// The default network is left alone; script its loss separately.
    pub fn set_airplane_mode(&self, enabled: bool) {
        let receivers: Vec<AirplaneCallback> = {
            let mut inner = self.lock();
            inner.airplane = enabled;
            inner.airplane_receivers.values().cloned().collect()
        };
        for receiver in &receivers {
            receiver(enabled);
        }
    }

    /// Number of live registrations of any kind.
    pub fn registration_count(&self) -> usize {
        let inner = self.lock();
        inner.network_callbacks.len() + inner.receivers.len() + inner.airplane_receivers.len()
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkPlatform for SimulatedPlatform {
    fn supports_network_callbacks(&self) -> bool {
        self.lock().supports_callbacks
    }

    fn active_network(&self) -> Option<Capabilities> {
        self.lock().network
    }

    fn airplane_mode(&self) -> bool {
        self.lock().airplane
    }

    fn register_network_callback(
        &self,
        callback: NetworkCallback,
    ) -> PlatformResult<Registration> {
        let mut inner = self.lock();
        if !inner.supports_callbacks {
            return Err(PlatformError::Unsupported("network callbacks"));
        }
        if inner.deny_callbacks {
            return Err(PlatformError::PermissionDenied("ACCESS_NETWORK_STATE".to_string()));
        }
        let registration = inner.next_registration();
        inner.network_callbacks.insert(registration.0, callback);
        Ok(registration)
    }

    fn register_connectivity_receiver(
        &self,
        callback: ReceiverCallback,
    ) -> PlatformResult<Registration> {
        let mut inner = self.lock();
        if inner.deny_receivers {
            return Err(PlatformError::PermissionDenied("ACCESS_NETWORK_STATE".to_string()));
        }
        let registration = inner.next_registration();
        inner.receivers.insert(registration.0, callback);
        Ok(registration)
    }

    fn register_airplane_receiver(
        &self,
        callback: AirplaneCallback,
    ) -> PlatformResult<Registration> {
        let mut inner = self.lock();
        let registration = inner.next_registration();
        inner.airplane_receivers.insert(registration.0, callback);
        Ok(registration)
    }

    fn unregister(&self, registration: Registration) {
        let mut inner = self.lock();
        inner.network_callbacks.remove(&registration.0);
        inner.receivers.remove(&registration.0);
        inner.airplane_receivers.remove(&registration.0);
    }
}
