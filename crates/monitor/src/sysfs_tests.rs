// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::atomic::AtomicUsize;

use super::*;
use tempfile::TempDir;

/// Builder for a fake sysfs tree.
struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("class/net/lo")).unwrap();
        fs::write(dir.path().join("class/net/lo/operstate"), "unknown\n").unwrap();
        FakeSysfs { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn iface(&self, name: &str, operstate: &str) -> PathBuf {
        let path = self.root().join("class/net").join(name);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("operstate"), format!("{}\n", operstate)).unwrap();
        path
    }

    fn ethernet(&self, name: &str, operstate: &str) {
        let path = self.iface(name, operstate);
        fs::create_dir_all(path.join("device")).unwrap();
        fs::write(path.join("type"), "1\n").unwrap();
    }

    fn wifi(&self, name: &str, operstate: &str) {
        let path = self.iface(name, operstate);
        fs::create_dir_all(path.join("device")).unwrap();
        fs::create_dir_all(path.join("wireless")).unwrap();
        fs::write(path.join("type"), "1\n").unwrap();
    }

    fn set_operstate(&self, name: &str, operstate: &str) {
        let path = self.root().join("class/net").join(name).join("operstate");
        fs::write(path, format!("{}\n", operstate)).unwrap();
    }

    fn radio(&self, name: &str, soft: bool) {
        let path = self.root().join("class/rfkill").join(name);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("soft"), if soft { "1\n" } else { "0\n" }).unwrap();
    }
}

fn names(interfaces: &[Interface]) -> Vec<&str> {
    interfaces.iter().map(|i| i.name.as_str()).collect()
}

#[test]
fn loopback_is_skipped() {
    let sys = FakeSysfs::new();
    assert!(read_interfaces(sys.root()).unwrap().is_empty());
}

#[test]
fn missing_net_dir_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(read_interfaces(dir.path()).is_err());
}

#[test]
fn interfaces_are_classified() {
    let sys = FakeSysfs::new();
    sys.wifi("wlan0", "up");
    sys.ethernet("eth0", "down");
    sys.iface("wwan0", "up");
    sys.iface("wg0", "unknown");
    sys.iface("bnep0", "up");

    let interfaces = read_interfaces(sys.root()).unwrap();
    let transports: Vec<(&str, Transport)> = interfaces
        .iter()
        .map(|i| (i.name.as_str(), i.transport))
        .collect();
    assert_eq!(
        transports,
        vec![
            ("bnep0", Transport::Bluetooth),
            ("eth0", Transport::Ethernet),
            ("wg0", Transport::Vpn),
            ("wlan0", Transport::Wifi),
            ("wwan0", Transport::Cellular),
        ]
    );
}

#[test]
fn virtual_devices_are_skipped() {
    let sys = FakeSysfs::new();
    let bridge = sys.iface("docker0", "up");
    fs::write(bridge.join("type"), "1\n").unwrap();
    sys.iface("veth1234", "up");
    sys.ethernet("eth0", "up");

    assert_eq!(names(&read_interfaces(sys.root()).unwrap()), vec!["eth0"]);
}

#[test]
fn device_with_unusual_type_is_other() {
    let sys = FakeSysfs::new();
    let path = sys.iface("ib0", "up");
    fs::create_dir_all(path.join("device")).unwrap();
    fs::write(path.join("type"), "32\n").unwrap();

    let interfaces = read_interfaces(sys.root()).unwrap();
    assert_eq!(interfaces[0].transport, Transport::Other);
}

#[test]
fn operstate_decides_up() {
    let sys = FakeSysfs::new();
    sys.ethernet("eth0", "up");
    sys.ethernet("eth1", "down");
    sys.ethernet("eth2", "dormant");
    let tun = sys.iface("tun0", "unknown");
    fs::write(tun.join("carrier"), "1\n").unwrap();
    sys.iface("tun1", "unknown");

    let interfaces = read_interfaces(sys.root()).unwrap();
    let up: Vec<&str> = interfaces
        .iter()
        .filter(|i| i.up)
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(up, vec!["eth0", "tun0"]);
}

#[test]
fn nothing_up_means_no_network() {
    let sys = FakeSysfs::new();
    sys.ethernet("eth0", "down");
    let interfaces = read_interfaces(sys.root()).unwrap();
    assert_eq!(default_network(&interfaces), None);
}

#[test]
fn wifi_network_is_unmetered() {
    let sys = FakeSysfs::new();
    sys.wifi("wlan0", "up");
    let caps = default_network(&read_interfaces(sys.root()).unwrap()).unwrap();

    assert!(caps.internet);
    assert_eq!(caps.kind(), NetworkKind::Wifi);
    assert_eq!(caps.not_metered, Some(true));
    assert_eq!(caps.validated, None);
}

#[test]
fn cellular_network_keeps_metered_default() {
    let sys = FakeSysfs::new();
    sys.iface("wwan0", "up");
    let caps = default_network(&read_interfaces(sys.root()).unwrap()).unwrap();

    assert_eq!(caps.kind(), NetworkKind::Cellular);
    assert_eq!(caps.not_metered, None);
    assert!(nr_core::reduce(Some(&caps)).is_metered_cellular());
}

#[test]
fn vpn_over_wifi_reports_wifi() {
    let sys = FakeSysfs::new();
    sys.wifi("wlan0", "up");
    let tun = sys.iface("tun0", "unknown");
    fs::write(tun.join("carrier"), "1\n").unwrap();

    let caps = default_network(&read_interfaces(sys.root()).unwrap()).unwrap();
    assert!(caps.transports.contains(Transport::Vpn));
    assert_eq!(caps.kind(), NetworkKind::Wifi);
}

#[test]
fn airplane_mode_without_rfkill_is_off() {
    let sys = FakeSysfs::new();
    assert!(!read_airplane_mode(sys.root()).unwrap());
}

#[test]
fn airplane_mode_with_empty_rfkill_is_off() {
    let sys = FakeSysfs::new();
    fs::create_dir_all(sys.root().join("class/rfkill")).unwrap();
    assert!(!read_airplane_mode(sys.root()).unwrap());
}

#[test]
fn airplane_mode_requires_every_radio_blocked() {
    let sys = FakeSysfs::new();
    sys.radio("rfkill0", true);
    sys.radio("rfkill1", false);
    assert!(!read_airplane_mode(sys.root()).unwrap());

    sys.radio("rfkill1", true);
    assert!(read_airplane_mode(sys.root()).unwrap());
}

#[test]
fn platform_does_not_offer_network_callbacks() {
    let sys = FakeSysfs::new();
    let platform = SysfsPlatform::new(sys.root(), Duration::from_secs(1));

    assert!(!platform.supports_network_callbacks());
    let result = platform.register_network_callback(Arc::new(|_| {}));
    assert_eq!(result, Err(PlatformError::Unsupported("network callbacks")));
}

#[test]
fn receiver_registration_needs_runtime() {
    let sys = FakeSysfs::new();
    let platform = SysfsPlatform::new(sys.root(), Duration::from_secs(1));
    let result = platform.register_connectivity_receiver(Arc::new(|| {}));
    assert!(matches!(result, Err(PlatformError::Failed(_))));
}

#[tokio::test(start_paused = true)]
async fn receivers_fire_only_on_change() {
    let sys = FakeSysfs::new();
    sys.wifi("wlan0", "down");
    let platform = SysfsPlatform::new(sys.root(), Duration::from_millis(500));

    let changes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&changes);
    platform
        .register_connectivity_receiver(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    assert!(platform.is_polling());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(changes.load(Ordering::SeqCst), 0);

    sys.set_operstate("wlan0", "up");
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert_eq!(platform.active_network().unwrap().kind(), NetworkKind::Wifi);

    sys.set_operstate("wlan0", "down");
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(changes.load(Ordering::SeqCst), 2);
    assert_eq!(platform.active_network(), None);
}

#[tokio::test(start_paused = true)]
async fn airplane_receiver_gets_new_state() {
    let sys = FakeSysfs::new();
    sys.radio("rfkill0", false);
    let platform = SysfsPlatform::new(sys.root(), Duration::from_millis(500));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    platform
        .register_airplane_receiver(Arc::new(move |enabled| {
            sink.lock().unwrap().push(enabled);
        }))
        .unwrap();
    // Let the poller take its first snapshot.
    tokio::time::sleep(Duration::from_millis(10)).await;

    sys.radio("rfkill0", true);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(platform.airplane_mode());
    sys.radio("rfkill0", false);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn polling_stops_with_last_registration() {
    let sys = FakeSysfs::new();
    let platform = SysfsPlatform::new(sys.root(), Duration::from_millis(500));

    let a = platform.register_connectivity_receiver(Arc::new(|| {})).unwrap();
    let b = platform.register_airplane_receiver(Arc::new(|_| {})).unwrap();
    assert_ne!(a, b);

    platform.unregister(a);
    assert!(platform.is_polling());
    platform.unregister(b);
    assert!(!platform.is_polling());

    // Unknown handles are ignored.
    platform.unregister(Registration(99));
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_is_clamped() {
    let sys = FakeSysfs::new();
    let platform = SysfsPlatform::new(sys.root(), Duration::ZERO);
    platform.register_connectivity_receiver(Arc::new(|| {})).unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(platform.is_polling());
}

#[test]
fn unreadable_net_dir_is_tracked_until_it_recovers() {
    let dir = TempDir::new().unwrap();
    let platform = SysfsPlatform::new(dir.path(), Duration::from_secs(1));
    let unreadable = || platform.shared.net_unreadable.load(Ordering::Relaxed);

    assert_eq!(platform.active_network(), None);
    assert!(unreadable());
    // Repeated failures stay flagged rather than re-warning.
    assert_eq!(platform.active_network(), None);
    assert!(unreadable());

    fs::create_dir_all(dir.path().join("class/net")).unwrap();
    assert_eq!(platform.active_network(), None);
    assert!(!unreadable());
}
