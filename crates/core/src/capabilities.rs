// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Raw platform capability bits and their reduction into [`ConnectivityState`].
//!
//! Platforms report what they know about the default network as a
//! [`Capabilities`] record. Bits an older platform level cannot report are
//! `None`; [`reduce`] fills them with conservative defaults so that every
//! record maps to exactly one state.

use serde::{Deserialize, Serialize};

use crate::state::{CellularGrade, ConnectivityState, NetworkKind};

/// A single transport a network can run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    Vpn,
    Bluetooth,
    Other,
}

impl Transport {
    fn bit(self) -> u8 {
        match self {
            Transport::Wifi => 1 << 0,
            Transport::Cellular => 1 << 1,
            Transport::Ethernet => 1 << 2,
            Transport::Vpn => 1 << 3,
            Transport::Bluetooth => 1 << 4,
            Transport::Other => 1 << 5,
        }
    }
}

/// Set of transports reported for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Transports(u8);

impl Transports {
    /// The empty set.
    pub fn empty() -> Self {
        Transports(0)
    }

    /// Returns a copy of this set with `transport` added.
    pub fn with(self, transport: Transport) -> Self {
        Transports(self.0 | transport.bit())
    }

    pub fn contains(&self, transport: Transport) -> bool {
        self.0 & transport.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Transport> for Transports {
    fn from_iter<I: IntoIterator<Item = Transport>>(iter: I) -> Self {
        iter.into_iter().fold(Transports::empty(), Transports::with)
    }
}

/// Radio access technology reported for a cellular link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioTech {
    Gprs,
    Edge,
    Cdma,
    OneXRtt,
    Iden,
    Umts,
    EvdoRev0,
    EvdoRevA,
    Hsdpa,
    Hsupa,
    Hspa,
    EvdoRevB,
    Ehrpd,
    HspaPlus,
    Lte,
    Iwlan,
    Nr,
    Unknown,
}

impl RadioTech {
    /// Generation class of this radio technology.
    pub fn grade(self) -> CellularGrade {
        match self {
            RadioTech::Gprs
            | RadioTech::Edge
            | RadioTech::Cdma
            | RadioTech::OneXRtt
            | RadioTech::Iden => CellularGrade::TwoG,
            RadioTech::Umts
            | RadioTech::EvdoRev0
            | RadioTech::EvdoRevA
            | RadioTech::Hsdpa
            | RadioTech::Hsupa
            | RadioTech::Hspa => CellularGrade::ThreeG,
            RadioTech::EvdoRevB | RadioTech::Ehrpd | RadioTech::HspaPlus => {
                CellularGrade::ThreeGPlus
            }
            RadioTech::Lte | RadioTech::Iwlan => CellularGrade::FourG,
            RadioTech::Nr => CellularGrade::FiveG,
            RadioTech::Unknown => CellularGrade::Unknown,
        }
    }
}

/// What the platform reports about its current default network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub transports: Transports,
    /// The network claims to provide internet access.
    pub internet: bool,
    /// `None` where the platform level cannot validate.
    pub validated: Option<bool>,
    pub not_metered: Option<bool>,
    pub not_roaming: Option<bool>,
    pub radio: Option<RadioTech>,
}

impl Capabilities {
    /// An internet-capable network over a single transport with every optional bit unknown.
    pub fn internet(transport: Transport) -> Self {
        Capabilities {
            transports: Transports::empty().with(transport),
            internet: true,
            ..Capabilities::default()
        }
    }

    pub fn with_validated(mut self, validated: bool) -> Self {
        self.validated = Some(validated);
        self
    }

    pub fn with_metered(mut self, metered: bool) -> Self {
        self.not_metered = Some(!metered);
        self
    }

    pub fn with_roaming(mut self, roaming: bool) -> Self {
        self.not_roaming = Some(!roaming);
        self
    }

    pub fn with_radio(mut self, radio: RadioTech) -> Self {
        self.radio = Some(radio);
        self
    }

    /// Link type by transport precedence: wifi, cellular, ethernet, vpn, bluetooth.
    pub fn kind(&self) -> NetworkKind {
        let t = &self.transports;
        if t.contains(Transport::Wifi) {
            NetworkKind::Wifi
        } else if t.contains(Transport::Cellular) {
            NetworkKind::Cellular
        } else if t.contains(Transport::Ethernet) {
            NetworkKind::Ethernet
        } else if t.contains(Transport::Vpn) {
            NetworkKind::Vpn
        } else if t.contains(Transport::Bluetooth) {
            NetworkKind::Bluetooth
        } else {
            NetworkKind::Other
        }
    }
}

/// Reduces the platform's view of the default network into a normalized state.
///
/// `None` means the platform reports no default network.
pub fn reduce(network: Option<&Capabilities>) -> ConnectivityState {
    let caps = match network {
        Some(caps) if caps.internet => caps,
        _ => return ConnectivityState::disconnected(),
    };

    let kind = caps.kind();
    let cellular_grade = if kind == NetworkKind::Cellular {
        caps.radio.map(RadioTech::grade).unwrap_or_default()
    } else {
        CellularGrade::Unknown
    };

    ConnectivityState {
        connected: true,
        validated: caps.validated.unwrap_or(true),
        metered: caps.not_metered.map(|n| !n).unwrap_or(true),
        roaming: caps.not_roaming.map(|n| !n).unwrap_or(false),
        kind,
        cellular_grade,
    }
}

#[cfg(test)]
#[path = "capabilities_tests.rs"]
mod tests;
