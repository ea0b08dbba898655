// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity observer.
//!
//! Watches the platform's default network and turns its notifications into a
//! normalized [`ConnectivityState`](nr_core::ConnectivityState) plus discrete
//! transition events.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Platform   │────►│   Strategy   │────►│  Event loop  │──► listeners
//! │   (trait)    │     │ callback or  │     │ (one task)   │──► watch
//! └──────────────┘     │  broadcast   │     └──────────────┘
//!                      └──────────────┘
//! ```
//!
//! # Features
//!
//! - Capability probe picks per-network callbacks or broadcasts, with fallback
//! - Edge-only availability events; detail changes while connected are
//!   reported as capabilities changes
//! - Airplane-mode signal independent of the detection strategy
//! - Injectable platform trait, with an in-memory implementation for tests

mod error;
mod listener;
mod observer;
mod platform;
mod simulated;
mod strategy;

pub use error::{ObserverError, ObserverResult};
pub use listener::{ConnectivityListener, Transition};
pub use observer::ConnectivityObserver;
pub use platform::{
    AirplaneCallback, NetworkCallback, NetworkPlatform, NetworkSignal, PlatformError,
    PlatformResult, ReceiverCallback, Registration,
};
pub use simulated::SimulatedPlatform;
pub use strategy::StrategyKind;

#[cfg(test)]
mod test_helpers;
