// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for dispatcher tests.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use nr_core::{CellularGrade, ConnectivityState, NetworkKind};
use tokio::time::{Duration, Instant};

use crate::action::{ActionError, ActionResult, ReplayAction};
use crate::subscribers::RefreshSubscriber;

/// Records when each action ran.
#[derive(Default)]
pub struct Probe {
    calls: Mutex<Vec<(String, Instant)>>,
}

impl Probe {
    /// An action that records its invocation and then returns `result`.
    pub fn action(self: &Arc<Self>, id: &str, result: ActionResult) -> impl ReplayAction {
        let probe = Arc::clone(self);
        let id = id.to_string();
        move || {
            probe.record(&id);
            let result = result.clone();
            async move { result }
        }
    }

    pub fn ok(self: &Arc<Self>, id: &str) -> impl ReplayAction {
        self.action(id, Ok(()))
    }

    pub fn failing(self: &Arc<Self>, id: &str) -> impl ReplayAction {
        self.action(id, Err(ActionError::Offline))
    }

    pub fn record(&self, id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((id.to_string(), Instant::now()));
    }

    pub fn ids(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Offsets of each call from `start`.
    pub fn offsets(&self, start: Instant) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| at.duration_since(start))
            .collect()
    }
}

/// Subscriber that counts refresh requests.
#[derive(Default)]
pub struct Refreshes(AtomicUsize);

impl Refreshes {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl RefreshSubscriber for Refreshes {
    fn on_refresh_requested(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn state(kind: NetworkKind, metered: bool, cellular_grade: CellularGrade) -> ConnectivityState {
    ConnectivityState {
        connected: true,
        validated: true,
        metered,
        roaming: false,
        kind,
        cellular_grade,
    }
}

pub fn wifi() -> ConnectivityState {
    state(NetworkKind::Wifi, false, CellularGrade::Unknown)
}

pub fn cellular(grade: CellularGrade) -> ConnectivityState {
    state(NetworkKind::Cellular, true, grade)
}
