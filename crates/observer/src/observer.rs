// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The connectivity observer.
//!
//! Platform callbacks arrive on arbitrary threads. They are posted into a
//! single unbounded channel drained by one event-loop task, which owns the
//! listener set and the last observed state. Only that task classifies
//! transitions and fans them out.
//!
//! ```text
//! platform threads ──► EventSink ──► mpsc ──► EventLoop ──► listeners
//!                                                 │
//!                                                 └──► watch (current_state / watch)
//! ```

use std::sync::{Arc, Mutex};

use nr_core::{reduce, Capabilities, ConnectivityState, ObserverConfig};
use tokio::sync::{mpsc, watch};

use crate::error::ObserverResult;
use crate::listener::{ConnectivityListener, ListenerSet, Transition};
use crate::platform::{AirplaneCallback, NetworkPlatform, Registration};
use crate::strategy::{self, DetectionStrategy, EventSink, Signal, StrategyKind};

/// Messages processed by the event loop.
pub(crate) enum Command {
    Activate { generation: u64 },
    Deactivate { generation: u64 },
    Subscribe(Arc<dyn ConnectivityListener>),
    Unsubscribe(Arc<dyn ConnectivityListener>),
    Platform { generation: u64, signal: Signal },
}

#[derive(Default)]
struct RegistrationState {
    next_generation: u64,
    active: Option<ActiveRegistration>,
}

struct ActiveRegistration {
    generation: u64,
    /// `None` when every strategy failed to register.
    strategy: Option<Box<dyn DetectionStrategy>>,
    airplane: Option<Registration>,
}

/// Single source of truth for the device's connectivity.
pub struct ConnectivityObserver {
    platform: Arc<dyn NetworkPlatform>,
    config: ObserverConfig,
    tx: mpsc::UnboundedSender<Command>,
    state: Arc<watch::Sender<ConnectivityState>>,
    registration: Mutex<RegistrationState>,
}

impl ConnectivityObserver {
    /// Creates an observer and spawns its event loop on the current Tokio runtime.
    ///
    /// The observer does not watch anything until [`register`](Self::register).
    pub fn new(platform: Arc<dyn NetworkPlatform>, config: ObserverConfig) -> ObserverResult<Self> {
        let handle = tokio::runtime::Handle::try_current()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(watch::channel(ConnectivityState::disconnected()).0);

        let event_loop = EventLoop {
            platform: Arc::clone(&platform),
            state: Arc::clone(&state),
            listeners: ListenerSet::default(),
            active: None,
            last: ConnectivityState::disconnected(),
            radios_off: false,
            network_present: false,
        };
        handle.spawn(event_loop.run(rx));

        Ok(ConnectivityObserver {
            platform,
            config,
            tx,
            state,
            registration: Mutex::new(RegistrationState::default()),
        })
    }

    /// Begins observation.
    ///
    /// Calling this while registered is a no-op, unless the earlier attempt
    /// could not attach any strategy, in which case attaching is retried.
    /// The current state is published before returning.
    pub fn register(&self) {
        let mut reg = self.registration.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(active) = reg.active.as_mut() {
            if active.strategy.is_some() {
                tracing::debug!("connectivity observer already registered");
                return;
            }
            let sink = EventSink::new(self.tx.clone(), active.generation);
            active.strategy = strategy::start_first(&*self.platform, &self.config, &sink);
            if active.strategy.is_some() {
                self.publish_initial(&sink);
            }
            return;
        }

        reg.next_generation += 1;
        let generation = reg.next_generation;
        // Activate before any strategy can post, so nothing is dropped as stale.
        let _ = self.tx.send(Command::Activate { generation });

        let sink = EventSink::new(self.tx.clone(), generation);
        let strategy = strategy::start_first(&*self.platform, &self.config, &sink);

        let airplane_sink = sink.clone();
        let on_airplane: AirplaneCallback =
            Arc::new(move |enabled| airplane_sink.post(Signal::AirplaneMode(enabled)));
        let airplane = match self.platform.register_airplane_receiver(on_airplane) {
            Ok(registration) => Some(registration),
            Err(e) => {
                tracing::warn!("airplane-mode receiver failed to register: {}", e);
                None
            }
        };

        if strategy.is_some() {
            self.publish_initial(&sink);
        }

        reg.active = Some(ActiveRegistration {
            generation,
            strategy,
            airplane,
        });
    }

    /// Stops observation and releases platform registrations.
    ///
    /// The published state stays at its last value. Idempotent.
    pub fn unregister(&self) {
        let mut reg = self.registration.lock().unwrap_or_else(|e| e.into_inner());
        let Some(mut active) = reg.active.take() else {
            return;
        };

        if let Some(mut strategy) = active.strategy.take() {
            strategy.stop(&*self.platform);
        }
        if let Some(airplane) = active.airplane {
            self.platform.unregister(airplane);
        }
        let _ = self.tx.send(Command::Deactivate {
            generation: active.generation,
        });
        tracing::info!("connectivity observer unregistered");
    }

    pub fn is_registered(&self) -> bool {
        let reg = self.registration.lock().unwrap_or_else(|e| e.into_inner());
        reg.active.is_some()
    }

    /// The strategy currently feeding the observer, if any attached.
    pub fn active_strategy(&self) -> Option<StrategyKind> {
        let reg = self.registration.lock().unwrap_or_else(|e| e.into_inner());
        reg.active
            .as_ref()
            .and_then(|active| active.strategy.as_ref())
            .map(|strategy| strategy.kind())
    }

    /// Snapshot of the last published state. Never blocks on the event loop.
    pub fn current_state(&self) -> ConnectivityState {
        *self.state.borrow()
    }

    /// A receiver that observes every published state.
    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.state.subscribe()
    }

    /// Adds a listener. Subscribing the same listener twice is a no-op.
    pub fn subscribe(&self, listener: Arc<dyn ConnectivityListener>) {
        let _ = self.tx.send(Command::Subscribe(listener));
    }

    pub fn unsubscribe(&self, listener: &Arc<dyn ConnectivityListener>) {
        let _ = self.tx.send(Command::Unsubscribe(Arc::clone(listener)));
    }

    fn publish_initial(&self, sink: &EventSink) {
        let initial = if self.platform.airplane_mode() {
            ConnectivityState::disconnected()
        } else {
            reduce(self.platform.active_network().as_ref())
        };
        publish(&self.state, initial);
        // Lets the loop classify the initial state against its own history.
        sink.post(Signal::Recompute);
    }
}

impl Drop for ConnectivityObserver {
    fn drop(&mut self) {
        self.unregister();
    }
}

fn publish(state: &watch::Sender<ConnectivityState>, next: ConnectivityState) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}

struct EventLoop {
    platform: Arc<dyn NetworkPlatform>,
    state: Arc<watch::Sender<ConnectivityState>>,
    listeners: ListenerSet,
    active: Option<u64>,
    last: ConnectivityState,
    /// Airplane mode is suppressing the platform's network.
    radios_off: bool,
    /// The platform reported a default network on the last observation.
    network_present: bool,
}

impl EventLoop {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        tracing::debug!("connectivity event loop stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Activate { generation } => {
                self.active = Some(generation);
                self.radios_off = self.platform.airplane_mode();
                self.network_present = self.platform.active_network().is_some();
            }
            Command::Deactivate { generation } => {
                if self.active == Some(generation) {
                    self.active = None;
                }
            }
            Command::Subscribe(listener) => {
                self.listeners.add(listener);
                tracing::debug!("connectivity listeners: {}", self.listeners.len());
            }
            Command::Unsubscribe(listener) => self.listeners.remove(&listener),
            Command::Platform { generation, signal } => {
                if self.active != Some(generation) {
                    tracing::debug!("dropping signal from inactive registration {}", generation);
                    return;
                }
                let next = self.resolve(signal);
                self.apply(next);
            }
        }
    }

    fn resolve(&mut self, signal: Signal) -> ConnectivityState {
        match signal {
            Signal::Snapshot(caps) => self.observe(caps),
            Signal::Recompute => self.observe(self.platform.active_network()),
            Signal::AirplaneMode(true) => {
                tracing::info!("airplane mode enabled");
                self.radios_off = true;
                ConnectivityState::disconnected()
            }
            Signal::AirplaneMode(false) => {
                tracing::info!("airplane mode disabled");
                self.radios_off = false;
                self.observe(self.platform.active_network())
            }
        }
    }

    /// Reduces a platform observation, holding it at disconnected while
    /// airplane mode is on.
    ///
    /// A default network appearing during airplane mode (a radio re-enabled
    /// by hand) lifts the suppression; capability updates to a network that
    /// was already there do not.
    fn observe(&mut self, caps: Option<Capabilities>) -> ConnectivityState {
        let came_up = caps.is_some() && !self.network_present;
        self.network_present = caps.is_some();

        if self.radios_off {
            if !came_up {
                return ConnectivityState::disconnected();
            }
            tracing::info!("network came up during airplane mode");
            self.radios_off = false;
        }
        reduce(caps.as_ref())
    }

    fn apply(&mut self, next: ConnectivityState) {
        let transition = Transition::between(&self.last, &next);
        self.last = next;
        publish(&self.state, next);

        if let Some(transition) = transition {
            tracing::info!("connectivity {}: {}", transition.name(), next);
            self.listeners.dispatch(&transition);
        }
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
