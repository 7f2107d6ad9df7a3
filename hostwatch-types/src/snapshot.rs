//! Snapshot - the set of known hosts as of one successful poll.

use std::collections::BTreeMap;

use crate::{current_timestamp_ms, HostState, HostStatus, Zone};

/// A point-in-time view of every monitored host.
///
/// Hosts are keyed by identifier, so an identifier can appear at most once.
/// The map is ordered, which makes iteration (and everything derived from
/// it, such as diffing) deterministic.
///
/// # Example
///
/// ```rust
/// use hostwatch_types::{HostStatus, Snapshot};
///
/// let snapshot = Snapshot::builder()
///     .host("db-server", HostStatus::Ok)
///     .host("backup-nas", HostStatus::Ok)
///     .build();
///
/// assert!(snapshot.all_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Unix timestamp in milliseconds when this snapshot was taken.
    pub timestamp_ms: u64,

    /// Host states keyed by host identifier.
    pub hosts: BTreeMap<String, HostState>,
}

impl Snapshot {
    /// Create an empty snapshot with the current timestamp.
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    /// Create an empty snapshot with a specific timestamp.
    pub fn with_timestamp(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            hosts: BTreeMap::new(),
        }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Check if the snapshot is empty (no hosts).
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Number of hosts in the snapshot.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Get the state of a specific host.
    pub fn get(&self, id: &str) -> Option<&HostState> {
        self.hosts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.hosts.contains_key(id)
    }

    /// Iterate over all hosts in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HostState)> {
        self.hosts.iter()
    }

    /// Insert a host, keyed by its identifier.
    ///
    /// Returns `false` (and leaves the snapshot unchanged) if a host with
    /// the same identifier is already present.
    pub fn insert(&mut self, host: HostState) -> bool {
        if self.hosts.contains_key(&host.id) {
            return false;
        }
        self.hosts.insert(host.id.clone(), host);
        true
    }

    /// True when the snapshot has at least one host and every host is OK.
    ///
    /// An empty snapshot is never "all OK".
    pub fn all_ok(&self) -> bool {
        !self.hosts.is_empty() && self.hosts.values().all(|h| h.status.is_ok())
    }

    /// Number of hosts with the given status.
    pub fn count(&self, status: HostStatus) -> usize {
        self.hosts.values().filter(|h| h.status == status).count()
    }

    /// Hosts sorted by zone priority (most important first), then identifier.
    pub fn by_priority(&self) -> Vec<&HostState> {
        let mut hosts: Vec<&HostState> = self.hosts.values().collect();
        hosts.sort_by(|a, b| a.priority().cmp(&b.priority()).then_with(|| a.id.cmp(&b.id)));
        hosts
    }

    /// Consume the snapshot, returning the host map.
    pub fn into_hosts(self) -> BTreeMap<String, HostState> {
        self.hosts
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    timestamp_ms: Option<u64>,
    hosts: Vec<HostState>,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Add a host in the `Other` zone whose name equals its identifier.
    pub fn host(self, id: impl Into<String>, status: HostStatus) -> Self {
        self.host_in_zone(id, status, Zone::Other)
    }

    /// Add a host in a specific zone.
    pub fn host_in_zone(mut self, id: impl Into<String>, status: HostStatus, zone: Zone) -> Self {
        // last_seen is filled in from the snapshot timestamp at build time
        self.hosts.push(HostState::new(id, status, zone, 0));
        self
    }

    /// Add a fully built host state.
    pub fn host_state(mut self, host: HostState) -> Self {
        self.hosts.push(host);
        self
    }

    /// Build the snapshot.
    ///
    /// If the same identifier was added twice, the first one wins.
    pub fn build(self) -> Snapshot {
        let timestamp_ms = self.timestamp_ms.unwrap_or_else(current_timestamp_ms);
        let mut snapshot = Snapshot::with_timestamp(timestamp_ms);
        for mut host in self.hosts {
            if host.last_seen_ms == 0 {
                host.last_seen_ms = timestamp_ms;
            }
            snapshot.insert(host);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = Snapshot::builder()
            .timestamp_ms(1703160000000)
            .host("h1", HostStatus::Ok)
            .host("h2", HostStatus::Critical)
            .build();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.timestamp_ms, 1703160000000);
        assert_eq!(snapshot.get("h1").unwrap().last_seen_ms, 1703160000000);
        assert_eq!(snapshot.count(HostStatus::Critical), 1);
    }

    #[test]
    fn duplicate_identifiers_keep_first() {
        let snapshot = Snapshot::builder()
            .host("h1", HostStatus::Ok)
            .host("h1", HostStatus::Critical)
            .build();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("h1").unwrap().status, HostStatus::Ok);
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut snapshot = Snapshot::with_timestamp(1);
        assert!(snapshot.insert(HostState::new("a", HostStatus::Ok, Zone::Other, 1)));
        assert!(!snapshot.insert(HostState::new("a", HostStatus::Warning, Zone::Other, 1)));
        assert_eq!(snapshot.get("a").unwrap().status, HostStatus::Ok);
    }

    #[test]
    fn empty_snapshot_is_not_all_ok() {
        let snapshot = Snapshot::with_timestamp(0);
        assert!(snapshot.is_empty());
        assert!(!snapshot.all_ok());
    }

    #[test]
    fn all_ok_requires_every_host_ok() {
        let ok = Snapshot::builder()
            .host("a", HostStatus::Ok)
            .host("b", HostStatus::Ok)
            .build();
        assert!(ok.all_ok());

        let unknown = Snapshot::builder()
            .host("a", HostStatus::Ok)
            .host("b", HostStatus::Unknown)
            .build();
        assert!(!unknown.all_ok());
    }

    #[test]
    fn by_priority_sorts_by_zone_then_id() {
        let snapshot = Snapshot::builder()
            .host_in_zone("phone-anna", HostStatus::Ok, Zone::Mobile)
            .host_in_zone("srv-b", HostStatus::Ok, Zone::Server)
            .host_in_zone("srv-a", HostStatus::Ok, Zone::Server)
            .host_in_zone("switch", HostStatus::Ok, Zone::Network)
            .build();

        let order: Vec<&str> = snapshot.by_priority().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(order, vec!["srv-a", "srv-b", "switch", "phone-anna"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let snapshot = Snapshot::builder()
            .timestamp_ms(1703160000000)
            .host_in_zone("nas", HostStatus::Warning, Zone::Storage)
            .build();

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot, parsed);
    }
}
