//! Animation events emitted when hosts change state.

use std::fmt;
use std::str::FromStr;

use crate::HostStatus;

/// The kind of state change an animation represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnimationKind {
    /// A host went CRITICAL.
    Supernova,
    /// A host recovered to OK.
    Phoenix,
    /// A host entered WARNING.
    Warning,
    /// A host disappeared from the monitoring backend.
    Blackhole,
    /// A host appeared in the monitoring backend.
    Spawn,
    /// Every host is OK again. Not tied to a single host.
    Celebration,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 6] = [
        AnimationKind::Supernova,
        AnimationKind::Phoenix,
        AnimationKind::Warning,
        AnimationKind::Blackhole,
        AnimationKind::Spawn,
        AnimationKind::Celebration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnimationKind::Supernova => "supernova",
            AnimationKind::Phoenix => "phoenix",
            AnimationKind::Warning => "warning",
            AnimationKind::Blackhole => "blackhole",
            AnimationKind::Spawn => "spawn",
            AnimationKind::Celebration => "celebration",
        }
    }

    /// Whether events of this kind carry a host identifier.
    pub fn is_per_host(&self) -> bool {
        !matches!(self, AnimationKind::Celebration)
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown animation kind: {s}"))
    }
}

/// A single animation to be played by the renderer.
///
/// Events are append-only: the poller queues them and the renderer drains
/// them. A drained event is gone for good.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationEvent {
    pub kind: AnimationKind,

    /// Host the event refers to. `None` for [`AnimationKind::Celebration`].
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub host: Option<String>,

    /// The host's status before the change, when it had one.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub previous: Option<HostStatus>,

    /// Unix timestamp in milliseconds when the event was created.
    pub created_ms: u64,
}

impl AnimationEvent {
    /// Create an event for a single host.
    pub fn for_host(
        kind: AnimationKind,
        host: impl Into<String>,
        previous: Option<HostStatus>,
        created_ms: u64,
    ) -> Self {
        Self {
            kind,
            host: Some(host.into()),
            previous,
            created_ms,
        }
    }

    /// Create the global "all hosts OK" event.
    pub fn celebration(created_ms: u64) -> Self {
        Self {
            kind: AnimationKind::Celebration,
            host: None,
            previous: None,
            created_ms,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }
}

impl fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.host, self.previous) {
            (Some(host), Some(prev)) => write!(f, "{} {} (was {})", self.kind, host, prev),
            (Some(host), None) => write!(f, "{} {}", self.kind, host),
            (None, _) => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celebration_has_no_host() {
        let event = AnimationEvent::celebration(10);
        assert_eq!(event.kind, AnimationKind::Celebration);
        assert!(event.host().is_none());
        assert!(!event.kind.is_per_host());
    }

    #[test]
    fn kind_parses_from_name() {
        assert_eq!("supernova".parse::<AnimationKind>(), Ok(AnimationKind::Supernova));
        assert_eq!("BlackHole".parse::<AnimationKind>(), Ok(AnimationKind::Blackhole));
        assert!("meteor".parse::<AnimationKind>().is_err());
    }

    #[test]
    fn display_includes_previous_status() {
        let event = AnimationEvent::for_host(
            AnimationKind::Phoenix,
            "db-1",
            Some(HostStatus::Critical),
            0,
        );
        assert_eq!(event.to_string(), "phoenix db-1 (was CRIT)");
        assert_eq!(AnimationEvent::celebration(0).to_string(), "celebration");
    }
}
