//! Assigning hosts to zones.

use std::collections::HashMap;
use std::fmt;

use hostwatch_types::Zone;

/// Maps a host name to a [`Zone`].
pub trait Classifier: Send + Sync + fmt::Debug {
    fn classify(&self, name: &str) -> Zone;
}

/// Zone rules in match order. The first rule with a matching substring wins.
const NAME_RULES: &[(Zone, &[&str])] = &[
    (Zone::Server, &["server", "srv"]),
    (Zone::Network, &["router", "switch", "gateway"]),
    (Zone::Storage, &["nas", "storage"]),
    (Zone::Virtualization, &["proxmox", "esxi", "vm"]),
    (Zone::Iot, &["pi", "raspberry"]),
    (Zone::Workstation, &["pc", "desktop", "workstation"]),
    (Zone::Laptop, &["laptop", "notebook"]),
    (Zone::Mobile, &["phone", "iphone", "android"]),
    (Zone::Tablet, &["ipad", "tablet"]),
    (Zone::Camera, &["cam", "ring", "security"]),
    (Zone::SmartHome, &["home", "assistant", "alexa"]),
];

/// Classifies hosts by case-insensitive substrings of their name.
///
/// Anything that matches no rule lands in [`Zone::Other`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NameClassifier;

impl Classifier for NameClassifier {
    fn classify(&self, name: &str) -> Zone {
        let name = name.to_ascii_lowercase();
        NAME_RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|needle| name.contains(needle)))
            .map(|(zone, _)| *zone)
            .unwrap_or_default()
    }
}

/// Classifier with an explicit lookup table, for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedClassifier {
    zones: HashMap<String, Zone>,
    fallback: Zone,
}

impl FixedClassifier {
    pub fn new(fallback: Zone) -> Self {
        Self {
            zones: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, name: impl Into<String>, zone: Zone) -> Self {
        self.zones.insert(name.into(), zone);
        self
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, name: &str) -> Zone {
        self.zones.get(name).copied().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_classifier_priorities() {
        let c = NameClassifier;
        assert_eq!(c.classify("my-server").priority(), 0);
        assert_eq!(c.classify("router-main").priority(), 1);
        assert_eq!(c.classify("nas-backup").priority(), 2);
        assert_eq!(c.classify("laptop-eddy").priority(), 6);
    }

    #[test]
    fn name_classifier_zones() {
        let c = NameClassifier;
        assert_eq!(c.classify("PROXMOX-01"), Zone::Virtualization);
        assert_eq!(c.classify("raspberry"), Zone::Iot);
        assert_eq!(c.classify("office-desktop"), Zone::Workstation);
        assert_eq!(c.classify("android-tv"), Zone::Mobile);
        assert_eq!(c.classify("tablet-kitchen"), Zone::Tablet);
        assert_eq!(c.classify("doorbell-cam"), Zone::Camera);
        assert_eq!(c.classify("alexa-lounge"), Zone::SmartHome);
        assert_eq!(c.classify("thermostat"), Zone::Other);
    }

    #[test]
    fn earlier_rules_win() {
        // contains both "srv" and "nas"
        assert_eq!(NameClassifier.classify("srv-nas"), Zone::Server);
    }

    #[test]
    fn fixed_classifier_uses_table_then_fallback() {
        let c = FixedClassifier::new(Zone::Other).with("db", Zone::Server);
        assert_eq!(c.classify("db"), Zone::Server);
        assert_eq!(c.classify("anything"), Zone::Other);
    }
}
