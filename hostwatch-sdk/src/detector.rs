//! Diffing two snapshots into animation events.

use hostwatch_types::{
    current_timestamp_ms, AnimationEvent, AnimationKind, HostStatus, Snapshot,
};

/// Compares consecutive snapshots and produces the animations they imply.
///
/// Per host, in identifier order:
///
/// | previous      | current     | event     |
/// |---------------|-------------|-----------|
/// | absent        | any         | SPAWN     |
/// | any           | absent      | BLACKHOLE |
/// | not CRITICAL  | CRITICAL    | SUPERNOVA |
/// | not OK        | OK          | PHOENIX   |
/// | not WARNING   | WARNING     | WARNING   |
///
/// Transitions into UNKNOWN and unchanged hosts produce nothing. After the
/// per-host events, a single CELEBRATION is appended when the current
/// snapshot is all OK and the previous one was not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionDetector {
    require_prior_poll: bool,
}

impl TransitionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never celebrate against an empty previous snapshot.
    ///
    /// With this set, the very first poll stays quiet even if every host
    /// is OK.
    pub fn require_prior_poll(mut self, required: bool) -> Self {
        self.require_prior_poll = required;
        self
    }

    /// Diff using the current wall-clock time for event timestamps.
    pub fn diff(&self, previous: &Snapshot, current: &Snapshot) -> Vec<AnimationEvent> {
        self.diff_at(previous, current, current_timestamp_ms())
    }

    /// Diff with an explicit event timestamp.
    pub fn diff_at(
        &self,
        previous: &Snapshot,
        current: &Snapshot,
        now_ms: u64,
    ) -> Vec<AnimationEvent> {
        let mut events = Vec::new();
        let mut prev_iter = previous.hosts.iter().peekable();
        let mut cur_iter = current.hosts.iter().peekable();

        // Merge walk over two ordered maps.
        loop {
            match (prev_iter.peek(), cur_iter.peek()) {
                (Some((prev_id, prev)), Some((cur_id, cur))) => {
                    if prev_id < cur_id {
                        events.push(AnimationEvent::for_host(
                            AnimationKind::Blackhole,
                            prev_id.as_str(),
                            Some(prev.status),
                            now_ms,
                        ));
                        prev_iter.next();
                    } else if cur_id < prev_id {
                        events.push(spawn(cur_id, now_ms));
                        cur_iter.next();
                    } else {
                        if let Some(kind) = status_transition(prev.status, cur.status) {
                            events.push(AnimationEvent::for_host(
                                kind,
                                cur_id.as_str(),
                                Some(prev.status),
                                now_ms,
                            ));
                        }
                        prev_iter.next();
                        cur_iter.next();
                    }
                }
                (Some((prev_id, prev)), None) => {
                    events.push(AnimationEvent::for_host(
                        AnimationKind::Blackhole,
                        prev_id.as_str(),
                        Some(prev.status),
                        now_ms,
                    ));
                    prev_iter.next();
                }
                (None, Some((cur_id, _))) => {
                    events.push(spawn(cur_id, now_ms));
                    cur_iter.next();
                }
                (None, None) => break,
            }
        }

        if self.should_celebrate(previous, current) {
            events.push(AnimationEvent::celebration(now_ms));
        }

        events
    }

    fn should_celebrate(&self, previous: &Snapshot, current: &Snapshot) -> bool {
        if !current.all_ok() {
            return false;
        }
        if previous.is_empty() {
            return !self.require_prior_poll;
        }
        !previous.all_ok()
    }
}

fn spawn(id: &str, now_ms: u64) -> AnimationEvent {
    AnimationEvent::for_host(AnimationKind::Spawn, id, None, now_ms)
}

/// The animation for a host present in both snapshots, if any.
fn status_transition(previous: HostStatus, current: HostStatus) -> Option<AnimationKind> {
    if previous == current {
        return None;
    }
    match current {
        HostStatus::Critical => Some(AnimationKind::Supernova),
        HostStatus::Ok => Some(AnimationKind::Phoenix),
        HostStatus::Warning => Some(AnimationKind::Warning),
        HostStatus::Unknown => None,
    }
}
