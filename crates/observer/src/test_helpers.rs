// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for observer tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use nr_core::{Capabilities, ConnectivityState, ObserverConfig, Transport};

use crate::listener::ConnectivityListener;
use crate::observer::ConnectivityObserver;
use crate::simulated::SimulatedPlatform;

/// A transition as seen by a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seen {
    Available(ConnectivityState),
    Lost,
    Changed(ConnectivityState),
}

/// Listener that records every callback.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<Seen>>,
}

impl Recorder {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, pred: fn(&Seen) -> bool) -> usize {
        self.seen().iter().filter(|s| pred(s)).count()
    }

    pub fn available(&self) -> usize {
        self.count(|s| matches!(s, Seen::Available(_)))
    }

    pub fn lost(&self) -> usize {
        self.count(|s| matches!(s, Seen::Lost))
    }

    pub fn changed(&self) -> usize {
        self.count(|s| matches!(s, Seen::Changed(_)))
    }

    fn push(&self, seen: Seen) {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).push(seen);
    }
}

impl ConnectivityListener for Recorder {
    fn on_available(&self, state: &ConnectivityState) {
        self.push(Seen::Available(*state));
    }

    fn on_lost(&self) {
        self.push(Seen::Lost);
    }

    fn on_capabilities_changed(&self, state: &ConnectivityState) {
        self.push(Seen::Changed(*state));
    }
}

pub fn wifi(metered: bool) -> Capabilities {
    Capabilities::internet(Transport::Wifi)
        .with_validated(true)
        .with_metered(metered)
}

pub fn cellular() -> Capabilities {
    Capabilities::internet(Transport::Cellular)
        .with_validated(true)
        .with_metered(true)
}

/// Builds a registered-ready observer with a recorder subscribed.
pub fn observe(
    platform: &Arc<SimulatedPlatform>,
    config: ObserverConfig,
) -> (ConnectivityObserver, Arc<Recorder>) {
    let observer = ConnectivityObserver::new(platform.clone(), config).unwrap();
    let recorder = Arc::new(Recorder::default());
    observer.subscribe(recorder.clone());
    (observer, recorder)
}

/// Lets the event loop drain everything posted so far.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
