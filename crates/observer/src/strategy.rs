// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Detection strategies.
//!
//! Both strategies only translate platform notifications into [`Signal`]s;
//! state reduction and edge classification happen once, in the observer's
//! event loop, so the two cannot disagree about transition semantics.

use std::fmt;
use std::sync::Arc;

use nr_core::{Capabilities, ObserverConfig};
use tokio::sync::mpsc;

use crate::observer::Command;
use crate::platform::{
    NetworkCallback, NetworkPlatform, NetworkSignal, PlatformError, PlatformResult,
    ReceiverCallback, Registration,
};

/// Which detection mechanism is feeding the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Per-network callbacks on the default network.
    Callback,
    /// Connectivity-changed broadcasts followed by a fresh query.
    Broadcast,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Callback => "callback",
            StrategyKind::Broadcast => "broadcast",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw input to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// The platform handed us the default network's capabilities directly.
    Snapshot(Option<Capabilities>),
    /// Something changed; query the platform for the current default network.
    Recompute,
    AirplaneMode(bool),
}

/// Posts signals for one registration generation into the event loop.
#[derive(Clone)]
pub(crate) struct EventSink {
    tx: mpsc::UnboundedSender<Command>,
    generation: u64,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>, generation: u64) -> Self {
        EventSink { tx, generation }
    }

    /// Never blocks. Signals posted after the loop has exited are dropped.
    pub(crate) fn post(&self, signal: Signal) {
        let _ = self.tx.send(Command::Platform {
            generation: self.generation,
            signal,
        });
    }
}

/// A mechanism for learning about default-network changes.
pub(crate) trait DetectionStrategy: Send {
    fn kind(&self) -> StrategyKind;

    fn start(&mut self, platform: &dyn NetworkPlatform, sink: EventSink) -> PlatformResult<()>;

    /// Releases platform resources. Safe to call when not started.
    fn stop(&mut self, platform: &dyn NetworkPlatform);
}

#[derive(Default)]
pub(crate) struct CallbackStrategy {
    registration: Option<Registration>,
}

impl DetectionStrategy for CallbackStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Callback
    }

    fn start(&mut self, platform: &dyn NetworkPlatform, sink: EventSink) -> PlatformResult<()> {
        if !platform.supports_network_callbacks() {
            return Err(PlatformError::Unsupported("network callbacks"));
        }
        let callback: NetworkCallback = Arc::new(move |signal| match signal {
            NetworkSignal::Available => sink.post(Signal::Recompute),
            NetworkSignal::CapabilitiesChanged(caps) => sink.post(Signal::Snapshot(Some(caps))),
            NetworkSignal::Lost => sink.post(Signal::Snapshot(None)),
        });
        self.registration = Some(platform.register_network_callback(callback)?);
        Ok(())
    }

    fn stop(&mut self, platform: &dyn NetworkPlatform) {
        if let Some(registration) = self.registration.take() {
            platform.unregister(registration);
        }
    }
}

#[derive(Default)]
pub(crate) struct BroadcastStrategy {
    registration: Option<Registration>,
}

impl DetectionStrategy for BroadcastStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Broadcast
    }

    fn start(&mut self, platform: &dyn NetworkPlatform, sink: EventSink) -> PlatformResult<()> {
        let callback: ReceiverCallback = Arc::new(move || sink.post(Signal::Recompute));
        self.registration = Some(platform.register_connectivity_receiver(callback)?);
        Ok(())
    }

    fn stop(&mut self, platform: &dyn NetworkPlatform) {
        if let Some(registration) = self.registration.take() {
            platform.unregister(registration);
        }
    }
}

/// Strategies in the order they should be tried.
///
/// The capability probe puts callbacks first when the platform supports them
/// and the config allows it; the other strategy is always kept as a fallback.
pub(crate) fn candidates(
    platform: &dyn NetworkPlatform,
    config: &ObserverConfig,
) -> Vec<Box<dyn DetectionStrategy>> {
    let callback: Box<dyn DetectionStrategy> = Box::new(CallbackStrategy::default());
    let broadcast: Box<dyn DetectionStrategy> = Box::new(BroadcastStrategy::default());
    if config.prefer_callbacks && platform.supports_network_callbacks() {
        vec![callback, broadcast]
    } else {
        vec![broadcast, callback]
    }
}

/// Starts the first strategy that registers successfully.
pub(crate) fn start_first(
    platform: &dyn NetworkPlatform,
    config: &ObserverConfig,
    sink: &EventSink,
) -> Option<Box<dyn DetectionStrategy>> {
    for mut strategy in candidates(platform, config) {
        match strategy.start(platform, sink.clone()) {
            Ok(()) => {
                tracing::info!("connectivity observer using {} strategy", strategy.kind());
                return Some(strategy);
            }
            Err(e) => {
                tracing::warn!("{} strategy failed to register: {}", strategy.kind(), e);
            }
        }
    }
    tracing::error!("no connectivity strategy could register, assuming offline");
    None
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
