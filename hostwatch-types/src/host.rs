//! Host status, zone and per-host state.

use std::fmt;
use std::str::FromStr;

/// Monitoring status of a single host.
///
/// The numeric codes match the CheckMK host state column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum HostStatus {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl HostStatus {
    /// Map a numeric status code (0 = OK, 1 = WARNING, 2 = CRITICAL, 3 = UNKNOWN).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(HostStatus::Ok),
            1 => Some(HostStatus::Warning),
            2 => Some(HostStatus::Critical),
            3 => Some(HostStatus::Unknown),
            _ => None,
        }
    }

    /// Map a symbolic status name. Matching is case-insensitive.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "OK" | "UP" => Some(HostStatus::Ok),
            "WARN" | "WARNING" => Some(HostStatus::Warning),
            "CRIT" | "CRITICAL" | "DOWN" => Some(HostStatus::Critical),
            "UNKNOWN" | "UNREACH" | "UNREACHABLE" => Some(HostStatus::Unknown),
            _ => None,
        }
    }

    /// The numeric status code.
    pub fn code(&self) -> u8 {
        match self {
            HostStatus::Ok => 0,
            HostStatus::Warning => 1,
            HostStatus::Critical => 2,
            HostStatus::Unknown => 3,
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HostStatus::Ok => "OK",
            HostStatus::Warning => "WARN",
            HostStatus::Critical => "CRIT",
            HostStatus::Unknown => "UNKN",
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == HostStatus::Ok
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error returned when a status string names no known status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised host status: {:?}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for HostStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.trim().parse::<i64>() {
            return HostStatus::from_code(code).ok_or_else(|| ParseStatusError(s.to_string()));
        }
        HostStatus::from_symbol(s).ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Category a host belongs to, derived from its name.
///
/// Zones drive display ordering: infrastructure first, personal devices last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Zone {
    Server,
    Network,
    Storage,
    Virtualization,
    Iot,
    Workstation,
    Laptop,
    Mobile,
    Tablet,
    Camera,
    SmartHome,
    #[default]
    Other,
}

impl Zone {
    /// Display priority; 0 is the most important.
    pub fn priority(&self) -> u8 {
        match self {
            Zone::Server => 0,
            Zone::Network => 1,
            Zone::Storage => 2,
            Zone::Virtualization => 3,
            Zone::Iot => 4,
            Zone::Workstation => 5,
            Zone::Laptop => 6,
            Zone::Camera | Zone::SmartHome | Zone::Other => 7,
            Zone::Mobile => 8,
            Zone::Tablet => 9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Server => "server",
            Zone::Network => "network",
            Zone::Storage => "storage",
            Zone::Virtualization => "virtualization",
            Zone::Iot => "iot",
            Zone::Workstation => "workstation",
            Zone::Laptop => "laptop",
            Zone::Mobile => "mobile",
            Zone::Tablet => "tablet",
            Zone::Camera => "camera",
            Zone::SmartHome => "smart_home",
            Zone::Other => "other",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State of one monitored host as of a single poll.
///
/// Host states are immutable values: each successful poll produces fresh
/// ones rather than updating the previous ones in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostState {
    /// Unique identifier reported by the monitoring backend.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Current monitoring status.
    pub status: HostStatus,

    /// Category assigned by the classifier.
    pub zone: Zone,

    /// Unix timestamp in milliseconds of the poll that reported this state.
    pub last_seen_ms: u64,
}

impl HostState {
    /// Create a host state whose display name equals its identifier.
    pub fn new(id: impl Into<String>, status: HostStatus, zone: Zone, last_seen_ms: u64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            status,
            zone,
            last_seen_ms,
        }
    }

    /// Set a display name different from the identifier.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Shorthand for the zone's display priority.
    pub fn priority(&self) -> u8 {
        self.zone.priority()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_code() {
        assert_eq!(HostStatus::from_code(0), Some(HostStatus::Ok));
        assert_eq!(HostStatus::from_code(1), Some(HostStatus::Warning));
        assert_eq!(HostStatus::from_code(2), Some(HostStatus::Critical));
        assert_eq!(HostStatus::from_code(3), Some(HostStatus::Unknown));
        assert_eq!(HostStatus::from_code(4), None);
        assert_eq!(HostStatus::from_code(-1), None);
    }

    #[test]
    fn status_from_symbol_is_case_insensitive() {
        assert_eq!(HostStatus::from_symbol("ok"), Some(HostStatus::Ok));
        assert_eq!(HostStatus::from_symbol("UP"), Some(HostStatus::Ok));
        assert_eq!(HostStatus::from_symbol("Warn"), Some(HostStatus::Warning));
        assert_eq!(HostStatus::from_symbol("down"), Some(HostStatus::Critical));
        assert_eq!(HostStatus::from_symbol(" unreach "), Some(HostStatus::Unknown));
        assert_eq!(HostStatus::from_symbol("pending"), None);
    }

    #[test]
    fn status_from_str_accepts_codes_and_symbols() {
        assert_eq!("2".parse::<HostStatus>(), Ok(HostStatus::Critical));
        assert_eq!("critical".parse::<HostStatus>(), Ok(HostStatus::Critical));
        assert!("7".parse::<HostStatus>().is_err());
        assert!("flapping".parse::<HostStatus>().is_err());
    }

    #[test]
    fn code_matches_from_code() {
        for status in [
            HostStatus::Ok,
            HostStatus::Warning,
            HostStatus::Critical,
            HostStatus::Unknown,
        ] {
            assert_eq!(HostStatus::from_code(status.code() as i64), Some(status));
        }
    }

    #[test]
    fn zone_priorities_order_infrastructure_first() {
        assert!(Zone::Server.priority() < Zone::Network.priority());
        assert!(Zone::Network.priority() < Zone::Storage.priority());
        assert!(Zone::Laptop.priority() < Zone::Other.priority());
        assert!(Zone::Other.priority() < Zone::Mobile.priority());
        assert_eq!(Zone::Tablet.priority(), 9);
    }

    #[test]
    fn host_state_name_defaults_to_id() {
        let host = HostState::new("nas-01", HostStatus::Ok, Zone::Storage, 42);
        assert_eq!(host.name, "nas-01");
        assert_eq!(host.priority(), 2);

        let host = host.with_name("Basement NAS");
        assert_eq!(host.id, "nas-01");
        assert_eq!(host.name, "Basement NAS");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&HostStatus::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
