// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Platform boundary for connectivity detection.
//!
//! A [`NetworkPlatform`] exposes the primitives an operating system offers for
//! watching the default network. Callbacks registered here may be invoked on
//! any thread; the observer marshals everything onto its own event loop.

use std::fmt;
use std::sync::Arc;

use nr_core::Capabilities;

/// Error type for platform registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The caller lacks the permission needed to observe the network.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The platform does not offer this mechanism.
    #[error("mechanism not supported: {0}")]
    Unsupported(&'static str),

    /// Registration failed for another reason.
    #[error("registration failed: {0}")]
    Failed(String),
}

/// Result type for platform registration.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Handle returned by a successful registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration(pub u64);

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-network callback payload for the default network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkSignal {
    /// A default network became available. Capabilities follow separately.
    Available,
    /// The default network's capabilities changed.
    CapabilitiesChanged(Capabilities),
    /// The default network went away.
    Lost,
}

/// Callback for per-network signals.
pub type NetworkCallback = Arc<dyn Fn(NetworkSignal) + Send + Sync>;

/// Callback for "connectivity changed" broadcasts. Carries no payload.
pub type ReceiverCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback for airplane-mode broadcasts. Receives the new airplane state.
pub type AirplaneCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// The operating system's network-state primitives.
pub trait NetworkPlatform: Send + Sync + 'static {
    /// Capability probe: whether per-network callbacks are available.
    fn supports_network_callbacks(&self) -> bool;

    /// Capabilities of the current default network, or `None` if there is none.
    fn active_network(&self) -> Option<Capabilities>;

    /// Whether all radios are disabled.
    fn airplane_mode(&self) -> bool;

    /// Registers a callback for default-network signals.
    fn register_network_callback(&self, callback: NetworkCallback)
        -> PlatformResult<Registration>;

    /// Registers a receiver for connectivity-changed broadcasts.
    fn register_connectivity_receiver(
        &self,
        callback: ReceiverCallback,
    ) -> PlatformResult<Registration>;

    /// Registers a receiver for airplane-mode broadcasts.
    fn register_airplane_receiver(&self, callback: AirplaneCallback)
        -> PlatformResult<Registration>;

    /// Releases a registration. Unknown handles are ignored.
    fn unregister(&self, registration: Registration);
}
