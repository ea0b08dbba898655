// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! nr-core: Shared types for the netreplay subsystem.
//!
//! This crate provides the normalized connectivity model, the raw platform
//! capability record it is reduced from, and the configuration shared by the
//! observer and dispatcher crates.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod state;

pub use capabilities::{reduce, Capabilities, RadioTech, Transport, Transports};
pub use config::{Config, ObserverConfig, ReplayConfig};
pub use error::{Error, Result};
pub use state::{CellularGrade, ConnectivityState, NetworkKind};
