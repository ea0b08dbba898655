// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized connectivity model.
//!
//! A [`ConnectivityState`] is an immutable snapshot of network reachability.
//! Everything callers derive from it (online, fast, slow, concurrency hint)
//! is computed from the primitive fields on every call, so two states with
//! equal fields always answer identically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Link type of the default network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    /// No default network.
    #[default]
    None,
    Wifi,
    Cellular,
    Ethernet,
    Vpn,
    Bluetooth,
    /// A transport the platform reports but we do not classify.
    Other,
}

impl NetworkKind {
    /// Returns the string representation used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKind::None => "none",
            NetworkKind::Wifi => "wifi",
            NetworkKind::Cellular => "cellular",
            NetworkKind::Ethernet => "ethernet",
            NetworkKind::Vpn => "vpn",
            NetworkKind::Bluetooth => "bluetooth",
            NetworkKind::Other => "other",
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(NetworkKind::None),
            "wifi" => Ok(NetworkKind::Wifi),
            "cellular" => Ok(NetworkKind::Cellular),
            "ethernet" => Ok(NetworkKind::Ethernet),
            "vpn" => Ok(NetworkKind::Vpn),
            "bluetooth" => Ok(NetworkKind::Bluetooth),
            "other" => Ok(NetworkKind::Other),
            _ => Err(Error::InvalidNetworkKind(s.to_string())),
        }
    }
}

/// Generation class of a cellular link.
///
/// Only meaningful when the network kind is [`NetworkKind::Cellular`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellularGrade {
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "3g+")]
    ThreeGPlus,
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "5g")]
    FiveG,
}

impl CellularGrade {
    /// Returns the string representation used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            CellularGrade::Unknown => "unknown",
            CellularGrade::TwoG => "2g",
            CellularGrade::ThreeG => "3g",
            CellularGrade::ThreeGPlus => "3g+",
            CellularGrade::FourG => "4g",
            CellularGrade::FiveG => "5g",
        }
    }
}

impl fmt::Display for CellularGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CellularGrade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(CellularGrade::Unknown),
            "2g" => Ok(CellularGrade::TwoG),
            "3g" => Ok(CellularGrade::ThreeG),
            "3g+" => Ok(CellularGrade::ThreeGPlus),
            "4g" => Ok(CellularGrade::FourG),
            "5g" => Ok(CellularGrade::FiveG),
            _ => Err(Error::InvalidCellularGrade(s.to_string())),
        }
    }
}

/// Immutable snapshot of the device's connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectivityState {
    /// The platform reports a default route.
    pub connected: bool,
    /// The route was confirmed to reach the public internet.
    /// Equals `connected` where the platform cannot validate.
    pub validated: bool,
    /// Traffic may incur cost.
    pub metered: bool,
    pub roaming: bool,
    pub kind: NetworkKind,
    pub cellular_grade: CellularGrade,
}

impl ConnectivityState {
    /// The state reported before registration and whenever no network is usable.
    pub fn disconnected() -> Self {
        ConnectivityState {
            connected: false,
            validated: false,
            metered: true,
            roaming: false,
            kind: NetworkKind::None,
            cellular_grade: CellularGrade::Unknown,
        }
    }

    /// Connected and validated.
    pub fn is_online(&self) -> bool {
        self.connected && self.validated
    }

    /// Wifi or ethernet, or cellular at 4G/5G grade.
    pub fn is_fast(&self) -> bool {
        match self.kind {
            NetworkKind::Wifi | NetworkKind::Ethernet => true,
            NetworkKind::Cellular => {
                matches!(self.cellular_grade, CellularGrade::FourG | CellularGrade::FiveG)
            }
            _ => false,
        }
    }

    /// Cellular at 2G grade.
    pub fn is_slow(&self) -> bool {
        self.kind == NetworkKind::Cellular && self.cellular_grade == CellularGrade::TwoG
    }

    /// Returns true for a cellular link that may incur cost.
    pub fn is_metered_cellular(&self) -> bool {
        self.kind == NetworkKind::Cellular && self.metered
    }

    /// Worker-pool size hint for callers issuing their own requests.
    ///
    /// 1 on 2G, 2 on 3G, 3 otherwise.
    pub fn recommended_concurrency(&self) -> usize {
        if self.kind != NetworkKind::Cellular {
            return 3;
        }
        match self.cellular_grade {
            CellularGrade::TwoG => 1,
            CellularGrade::ThreeG => 2,
            _ => 3,
        }
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.connected {
            return write!(f, "disconnected");
        }
        write!(f, "{}", self.kind)?;
        if self.kind == NetworkKind::Cellular {
            write!(f, "/{}", self.cellular_grade)?;
        }
        if !self.validated {
            write!(f, " unvalidated")?;
        }
        if self.metered {
            write!(f, " metered")?;
        }
        if self.roaming {
            write!(f, " roaming")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
