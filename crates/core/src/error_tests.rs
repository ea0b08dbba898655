// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    network_kind = { Error::InvalidNetworkKind("satellite".into()), "satellite" },
    cellular_grade = { Error::InvalidCellularGrade("6g".into()), "6g" },
    invalid_config = {
        Error::InvalidConfig { field: "max_retries", reason: "must be at least 1".into() },
        "max_retries",
    },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn config_error_names_path() {
    let source = toml::from_str::<toml::Table>("= broken").unwrap_err();
    let err = Error::Config { path: PathBuf::from("/etc/netreplay.toml"), source };
    assert!(err.to_string().contains("/etc/netreplay.toml"));
}
