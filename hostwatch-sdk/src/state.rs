//! Shared state between the poll loop and its consumers.

use std::cell::RefCell;

use hostwatch_types::{AnimationEvent, Snapshot};
use parking_lot::ReentrantMutex;

use crate::TransitionDetector;

#[derive(Debug, Default)]
struct Inner {
    snapshot: Snapshot,
    events: Vec<AnimationEvent>,
    notification_requested: bool,
}

/// Last-known-good snapshot plus the pending animation queue.
///
/// Every access goes through one reentrant lock, so a thread that already
/// holds it (for example inside [`StateStore::commit`]) can call the other
/// accessors without deadlocking. No method hands out a reference into the
/// guarded data; readers always get owned copies.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: ReentrantMutex<RefCell<Inner>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current snapshot.
    pub fn read(&self) -> Snapshot {
        let guard = self.inner.lock();
        let snapshot = guard.borrow().snapshot.clone();
        snapshot
    }

    /// Replace the snapshot.
    pub fn write(&self, snapshot: Snapshot) {
        let guard = self.inner.lock();
        guard.borrow_mut().snapshot = snapshot;
    }

    /// Queue events for the renderer.
    pub fn append_events(&self, events: impl IntoIterator<Item = AnimationEvent>) {
        let guard = self.inner.lock();
        guard.borrow_mut().events.extend(events);
    }

    /// Take every queued event, leaving the queue empty.
    pub fn get_animation_queue_and_clear(&self) -> Vec<AnimationEvent> {
        let guard = self.inner.lock();
        let events = std::mem::take(&mut guard.borrow_mut().events);
        events
    }

    /// Number of events waiting to be drained.
    pub fn pending_events(&self) -> usize {
        let guard = self.inner.lock();
        let len = guard.borrow().events.len();
        len
    }

    /// Diff `current` against the stored snapshot, store it and queue the
    /// resulting events as one step.
    ///
    /// Returns the number of events queued.
    pub fn commit(&self, current: Snapshot, detector: &TransitionDetector, now_ms: u64) -> usize {
        let _guard = self.inner.lock();
        let previous = self.read();
        let events = detector.diff_at(&previous, &current, now_ms);
        let count = events.len();
        self.write(current);
        self.append_events(events);
        count
    }

    /// Flag that the renderer should show a notification.
    pub fn request_notification(&self) {
        let guard = self.inner.lock();
        guard.borrow_mut().notification_requested = true;
    }

    /// Read and reset the notification flag.
    pub fn take_notification_request(&self) -> bool {
        let guard = self.inner.lock();
        let requested = std::mem::replace(&mut guard.borrow_mut().notification_requested, false);
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_types::{AnimationKind, HostStatus};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn snapshot(ts: u64, hosts: &[(&str, HostStatus)]) -> Snapshot {
        hosts
            .iter()
            .fold(Snapshot::builder().timestamp_ms(ts), |b, (id, status)| {
                b.host(*id, *status)
            })
            .build()
    }

    #[test]
    fn starts_empty() {
        let store = StateStore::new();
        assert!(store.read().is_empty());
        assert!(store.get_animation_queue_and_clear().is_empty());
        assert!(!store.take_notification_request());
    }

    #[test]
    fn write_replaces_snapshot() {
        let store = StateStore::new();
        store.write(snapshot(1, &[("a", HostStatus::Ok)]));
        store.write(snapshot(2, &[("b", HostStatus::Warning)]));

        let read = store.read();
        assert_eq!(read.timestamp_ms, 2);
        assert!(!read.contains("a"));
        assert!(read.contains("b"));
    }

    #[test]
    fn drain_clears_queue() {
        let store = StateStore::new();
        store.append_events([AnimationEvent::celebration(1)]);
        assert_eq!(store.pending_events(), 1);

        assert_eq!(store.get_animation_queue_and_clear().len(), 1);
        assert!(store.get_animation_queue_and_clear().is_empty());
    }

    #[test]
    fn commit_diffs_against_stored_snapshot() {
        let store = StateStore::new();
        let detector = TransitionDetector::new();

        let queued = store.commit(snapshot(1, &[("a", HostStatus::Critical)]), &detector, 1);
        assert_eq!(queued, 1);

        let queued = store.commit(snapshot(2, &[("a", HostStatus::Ok)]), &detector, 2);
        assert_eq!(queued, 2);

        let kinds: Vec<AnimationKind> = store
            .get_animation_queue_and_clear()
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AnimationKind::Spawn,
                AnimationKind::Phoenix,
                AnimationKind::Celebration,
            ]
        );
        assert_eq!(store.read().timestamp_ms, 2);
    }

    #[test]
    fn notification_flag_is_taken_once() {
        let store = StateStore::new();
        store.request_notification();
        store.request_notification();
        assert!(store.take_notification_request());
        assert!(!store.take_notification_request());
    }

    #[test]
    fn concurrent_drains_never_duplicate_events() {
        let store = Arc::new(StateStore::new());
        let total = 2_000;

        let producer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..total {
                    store.append_events([AnimationEvent::for_host(
                        AnimationKind::Spawn,
                        format!("host-{i}"),
                        None,
                        i,
                    )]);
                }
            })
        };

        let drainers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..500 {
                        seen.extend(store.get_animation_queue_and_clear());
                        thread::yield_now();
                    }
                    seen
                })
            })
            .collect();

        producer.join().unwrap();
        let mut all: Vec<AnimationEvent> = drainers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.extend(store.get_animation_queue_and_clear());

        let unique: HashSet<u64> = all.iter().map(|e| e.created_ms).collect();
        assert_eq!(all.len(), total as usize);
        assert_eq!(unique.len(), total as usize);
    }

    #[test]
    fn readers_see_whole_snapshots() {
        let store = Arc::new(StateStore::new());
        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for ts in 1..=500u64 {
                    let status = if ts % 2 == 0 {
                        HostStatus::Ok
                    } else {
                        HostStatus::Critical
                    };
                    store.write(snapshot(ts, &[("a", status), ("b", status), ("c", status)]));
                }
            })
        };

        for _ in 0..500 {
            let snap = store.read();
            if snap.is_empty() {
                continue;
            }
            assert_eq!(snap.len(), 3);
            let first = snap.get("a").unwrap().status;
            assert!(snap.iter().all(|(_, h)| h.status == first));
        }
        writer.join().unwrap();
    }
}
