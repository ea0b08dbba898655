// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.replay.max_retries, 3);
    assert_eq!(config.replay.stagger(), Duration::from_millis(250));
    assert_eq!(config.replay.settle(), Duration::from_millis(500));
    assert_eq!(config.replay.grace(), Duration::from_millis(1000));
    assert_eq!(config.replay.max_pending, None);
    assert!(config.observer.prefer_callbacks);
    assert_eq!(config.observer.poll_interval(), Duration::from_secs(2));
}

#[test]
fn missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load(&temp.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[replay]\nstagger_ms = 10\nmax_pending = 64\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.replay.stagger_ms, 10);
    assert_eq!(config.replay.max_pending, Some(64));
    assert_eq!(config.replay.max_retries, 3);
    assert_eq!(config.observer, ObserverConfig::default());
}

#[test]
fn malformed_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[replay\nstagger_ms = ").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn invalid_values_fail_validation_on_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[replay]\nmax_retries = 0\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("max_retries"));
}

#[parameterized(
    zero_retries = { ReplayConfig { max_retries: 0, ..ReplayConfig::default() }, "max_retries" },
    zero_grace = { ReplayConfig { grace_multiple: 0, ..ReplayConfig::default() }, "grace_multiple" },
    zero_cap = { ReplayConfig { max_pending: Some(0), ..ReplayConfig::default() }, "max_pending" },
)]
fn validate_rejects(config: ReplayConfig, field: &str) {
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains(field));
}

#[test]
fn round_trips_through_toml() {
    let config = Config {
        replay: ReplayConfig { max_pending: Some(10), ..ReplayConfig::default() },
        observer: ObserverConfig { prefer_callbacks: false, poll_interval_ms: 500 },
    };
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}
