// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Linux [`NetworkPlatform`] backed by sysfs.
//!
//! The default network is derived from the interfaces under
//! `class/net` and airplane mode from the soft-block flags under
//! `class/rfkill`. sysfs has no change notifications, so registered
//! receivers are driven by a polling task that fires only when a snapshot
//! differs from the previous one.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use nr_core::{Capabilities, NetworkKind, Transport, Transports};
use nr_observer::{
    AirplaneCallback, NetworkCallback, NetworkPlatform, PlatformError, PlatformResult,
    ReceiverCallback, Registration,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

const VPN_PREFIXES: &[&str] = &["tun", "tap", "wg", "ipsec"];
const CELLULAR_PREFIXES: &[&str] = &["wwan", "rmnet"];

/// A network interface as read from `class/net/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Interface {
    pub name: String,
    pub up: bool,
    pub transport: Transport,
}

/// Reads every interface that could carry a default route, sorted by name.
///
/// Loopback and virtual devices without a backing device (bridges, veth
/// pairs) are skipped, except tunnels, which are always virtual.
pub(crate) fn read_interfaces(root: &Path) -> io::Result<Vec<Interface>> {
    let mut interfaces = Vec::new();
    for entry in fs::read_dir(root.join("class/net"))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "lo" {
            continue;
        }
        let path = entry.path();
        if let Some(transport) = classify(&name, &path) {
            interfaces.push(Interface {
                up: is_up(&path),
                transport,
                name,
            });
        }
    }
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(interfaces)
}

fn read_attr(path: &Path, attr: &str) -> Option<String> {
    fs::read_to_string(path.join(attr))
        .ok()
        .map(|value| value.trim().to_string())
}

fn is_up(path: &Path) -> bool {
    match read_attr(path, "operstate").as_deref() {
        Some("up") => true,
        // Tunnels report "unknown" while carrying traffic.
        Some("unknown") => read_attr(path, "carrier").as_deref() == Some("1"),
        _ => false,
    }
}

fn classify(name: &str, path: &Path) -> Option<Transport> {
    if path.join("wireless").is_dir() || path.join("phy80211").exists() {
        return Some(Transport::Wifi);
    }
    if CELLULAR_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return Some(Transport::Cellular);
    }
    if name.starts_with("bnep") {
        return Some(Transport::Bluetooth);
    }
    if VPN_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return Some(Transport::Vpn);
    }
    if !path.join("device").exists() {
        return None;
    }
    if read_attr(path, "type").as_deref() == Some("1") {
        Some(Transport::Ethernet)
    } else {
        Some(Transport::Other)
    }
}

/// Combines the interfaces that are up into one default network.
///
/// sysfs cannot report metering or validation. Wifi and wired links are
/// taken as unmetered; everything else keeps the conservative defaults.
pub(crate) fn default_network(interfaces: &[Interface]) -> Option<Capabilities> {
    let transports: Transports = interfaces
        .iter()
        .filter(|iface| iface.up)
        .map(|iface| iface.transport)
        .collect();
    if transports.is_empty() {
        return None;
    }

    let mut caps = Capabilities {
        transports,
        internet: true,
        ..Capabilities::default()
    };
    if matches!(caps.kind(), NetworkKind::Wifi | NetworkKind::Ethernet) {
        caps.not_metered = Some(true);
    }
    Some(caps)
}

/// True when at least one radio exists and every radio is soft-blocked.
pub(crate) fn read_airplane_mode(root: &Path) -> io::Result<bool> {
    let entries = match fs::read_dir(root.join("class/rfkill")) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let mut radios = 0;
    for entry in entries {
        let entry = entry?;
        if read_attr(&entry.path(), "soft").as_deref() != Some("1") {
            return Ok(false);
        }
        radios += 1;
    }
    Ok(radios > 0)
}

#[derive(Default)]
struct Receivers {
    next_id: u64,
    connectivity: HashMap<u64, ReceiverCallback>,
    airplane: HashMap<u64, AirplaneCallback>,
    poller: Option<JoinHandle<()>>,
}

impl Receivers {
    fn next_registration(&mut self) -> Registration {
        self.next_id += 1;
        Registration(self.next_id)
    }

    fn is_empty(&self) -> bool {
        self.connectivity.is_empty() && self.airplane.is_empty()
    }
}

struct Shared {
    root: PathBuf,
    poll_interval: Duration,
    receivers: Mutex<Receivers>,
    /// Set while `class/net` is unreadable; repeats of the failure log at debug.
    net_unreadable: AtomicBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    network: Option<Capabilities>,
    airplane: bool,
}

impl Shared {
    fn receivers(&self) -> MutexGuard<'_, Receivers> {
        self.receivers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn active_network(&self) -> Option<Capabilities> {
        match read_interfaces(&self.root) {
            Ok(interfaces) => {
                if self.net_unreadable.swap(false, Ordering::Relaxed) {
                    debug!("{} readable again", self.root.join("class/net").display());
                }
                default_network(&interfaces)
            }
            Err(e) => {
                let dir = self.root.join("class/net");
                if self.net_unreadable.swap(true, Ordering::Relaxed) {
                    debug!("cannot read {}: {}", dir.display(), e);
                } else {
                    warn!("cannot read {}: {}", dir.display(), e);
                }
                None
            }
        }
    }

    fn airplane_mode(&self) -> bool {
        read_airplane_mode(&self.root).unwrap_or_else(|e| {
            debug!("cannot read rfkill state: {}", e);
            false
        })
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            network: self.active_network(),
            airplane: self.airplane_mode(),
        }
    }
}

async fn poll(shared: Arc<Shared>) {
    let mut last = shared.snapshot();
    let mut ticker = tokio::time::interval(shared.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let next = shared.snapshot();

        if next.network != last.network {
            debug!("sysfs network changed");
            let callbacks: Vec<ReceiverCallback> =
                shared.receivers().connectivity.values().cloned().collect();
            for callback in callbacks {
                callback();
            }
        }
        if next.airplane != last.airplane {
            debug!("sysfs airplane mode: {}", next.airplane);
            let callbacks: Vec<AirplaneCallback> =
                shared.receivers().airplane.values().cloned().collect();
            for callback in callbacks {
                callback(next.airplane);
            }
        }
        last = next;
    }
}

/// [`NetworkPlatform`] reading a sysfs tree.
pub struct SysfsPlatform {
    shared: Arc<Shared>,
}

impl SysfsPlatform {
    /// `root` is the sysfs mount point, normally `/sys`.
    pub fn new(root: &Path, poll_interval: Duration) -> Self {
        SysfsPlatform {
            shared: Arc::new(Shared {
                root: root.to_path_buf(),
                poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
                receivers: Mutex::new(Receivers::default()),
                net_unreadable: AtomicBool::new(false),
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_polling(&self) -> bool {
        self.shared.receivers().poller.is_some()
    }

    fn ensure_poller(&self, receivers: &mut Receivers) -> PlatformResult<()> {
        if receivers.poller.is_some() {
            return Ok(());
        }
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| PlatformError::Failed(e.to_string()))?;
        receivers.poller = Some(handle.spawn(poll(Arc::clone(&self.shared))));
        debug!(
            "polling {} every {:?}",
            self.shared.root.display(),
            self.shared.poll_interval
        );
        Ok(())
    }
}

impl NetworkPlatform for SysfsPlatform {
    fn supports_network_callbacks(&self) -> bool {
        false
    }

    fn active_network(&self) -> Option<Capabilities> {
        self.shared.active_network()
    }

    fn airplane_mode(&self) -> bool {
        self.shared.airplane_mode()
    }

    fn register_network_callback(
        &self,
        _callback: NetworkCallback,
    ) -> PlatformResult<Registration> {
        Err(PlatformError::Unsupported("network callbacks"))
    }

    fn register_connectivity_receiver(
        &self,
        callback: ReceiverCallback,
    ) -> PlatformResult<Registration> {
        let mut receivers = self.shared.receivers();
        self.ensure_poller(&mut receivers)?;
        let registration = receivers.next_registration();
        receivers.connectivity.insert(registration.0, callback);
        Ok(registration)
    }

    fn register_airplane_receiver(
        &self,
        callback: AirplaneCallback,
    ) -> PlatformResult<Registration> {
        let mut receivers = self.shared.receivers();
        self.ensure_poller(&mut receivers)?;
        let registration = receivers.next_registration();
        receivers.airplane.insert(registration.0, callback);
        Ok(registration)
    }

    fn unregister(&self, registration: Registration) {
        let mut receivers = self.shared.receivers();
        receivers.connectivity.remove(&registration.0);
        receivers.airplane.remove(&registration.0);
        if receivers.is_empty() {
            if let Some(poller) = receivers.poller.take() {
                poller.abort();
                debug!("sysfs polling stopped");
            }
        }
    }
}

impl Drop for SysfsPlatform {
    fn drop(&mut self) {
        if let Some(poller) = self.shared.receivers().poller.take() {
            poller.abort();
        }
    }
}

#[cfg(test)]
#[path = "sysfs_tests.rs"]
mod tests;
