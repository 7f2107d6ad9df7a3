//! Out-of-band triggers: notifications and test animations.
//!
//! Other programs signal the poller by dropping a marker file, e.g.
//! `touch /tmp/hostwatch_task_complete.txt`. Each marker is consumed the
//! first time it is seen.

use std::collections::HashSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hostwatch_types::AnimationKind;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::Poller;

/// Somewhere triggers can be raised.
#[async_trait]
pub trait TriggerSource: Send + Sync + fmt::Debug {
    /// Whether `name` was raised since the last check. Clears it if so.
    async fn check_and_clear(&self, name: &str) -> bool;
}

/// A recognised trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// A long-running task finished.
    TaskComplete,
    /// An AI coding agent finished.
    CodexComplete,
    /// Play an animation on demand.
    Animation(AnimationKind),
}

impl Trigger {
    /// Every trigger, in scan order.
    pub fn all() -> impl Iterator<Item = Trigger> {
        [Trigger::TaskComplete, Trigger::CodexComplete]
            .into_iter()
            .chain(AnimationKind::ALL.into_iter().map(Trigger::Animation))
    }

    /// Marker name for this trigger.
    pub fn name(&self) -> String {
        match self {
            Trigger::TaskComplete => "task_complete".to_string(),
            Trigger::CodexComplete => "codex_complete".to_string(),
            Trigger::Animation(kind) => format!("trigger_{}", kind.name()),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Scan `source` once and apply every trigger that was raised.
///
/// Returns the triggers found, in scan order.
pub async fn check_triggers(source: &dyn TriggerSource, poller: &Poller) -> Vec<Trigger> {
    let mut fired = Vec::new();

    for trigger in Trigger::all() {
        if !source.check_and_clear(&trigger.name()).await {
            continue;
        }

        match trigger {
            Trigger::TaskComplete | Trigger::CodexComplete => {
                info!(trigger = %trigger, "Notification requested");
                poller.request_notification();
            }
            Trigger::Animation(kind) => {
                if poller.inject_event(kind).is_none() {
                    debug!(trigger = %trigger, "No hosts known, ignoring animation trigger");
                }
            }
        }
        fired.push(trigger);
    }

    fired
}

/// Triggers backed by marker files `<dir>/hostwatch_<name>.txt`.
#[derive(Debug, Clone)]
pub struct FileTriggers {
    dir: PathBuf,
}

impl FileTriggers {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Marker file path for a trigger name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("hostwatch_{name}.txt"))
    }
}

#[async_trait]
impl TriggerSource for FileTriggers {
    async fn check_and_clear(&self, name: &str) -> bool {
        let path = self.path_for(name);

        match tokio::fs::read_to_string(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return false,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Unreadable trigger file");
                return false;
            }
        }

        if let Err(e) = tokio::fs::remove_file(&path).await {
            debug!(path = %path.display(), error = %e, "Could not remove trigger file");
        }
        true
    }
}

/// In-memory triggers for tests.
#[derive(Debug, Default)]
pub struct MemoryTriggers {
    raised: Mutex<HashSet<String>>,
}

impl MemoryTriggers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self, name: impl Into<String>) {
        self.raised.lock().insert(name.into());
    }

    pub fn is_raised(&self, name: &str) -> bool {
        self.raised.lock().contains(name)
    }
}

#[async_trait]
impl TriggerSource for MemoryTriggers {
    async fn check_and_clear(&self, name: &str) -> bool {
        self.raised.lock().remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hostwatch_adapters::MockTransport;
    use hostwatch_types::HostStatus;

    #[test]
    fn trigger_names() {
        let names: Vec<String> = Trigger::all().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "task_complete",
                "codex_complete",
                "trigger_supernova",
                "trigger_phoenix",
                "trigger_warning",
                "trigger_blackhole",
                "trigger_spawn",
                "trigger_celebration",
            ]
        );
    }

    #[tokio::test]
    async fn file_trigger_is_consumed_once() {
        let dir = tempfile::tempdir().unwrap();
        let triggers = FileTriggers::new(dir.path());
        let marker = dir.path().join("hostwatch_task_complete.txt");
        assert_eq!(triggers.path_for("task_complete"), marker);

        assert!(!triggers.check_and_clear("task_complete").await);

        std::fs::write(&marker, "done\n").unwrap();
        assert!(triggers.check_and_clear("task_complete").await);
        assert!(!marker.exists());
        assert!(!triggers.check_and_clear("task_complete").await);
    }

    #[tokio::test]
    async fn memory_trigger_is_consumed_once() {
        let triggers = MemoryTriggers::new();
        triggers.raise("codex_complete");
        assert!(triggers.is_raised("codex_complete"));
        assert!(triggers.check_and_clear("codex_complete").await);
        assert!(!triggers.check_and_clear("codex_complete").await);
    }

    #[tokio::test]
    async fn check_triggers_applies_notifications_and_animations() {
        let transport = Arc::new(MockTransport::new());
        transport.push_hosts([("nas", HostStatus::Ok), ("my-server", HostStatus::Ok)]);
        let poller = Poller::builder(transport).build();
        poller.poll_once().await.unwrap();
        poller.drain_animation_events();

        let triggers = MemoryTriggers::new();
        triggers.raise("task_complete");
        triggers.raise("trigger_phoenix");

        let fired = check_triggers(&triggers, &poller).await;
        assert_eq!(
            fired,
            vec![
                Trigger::TaskComplete,
                Trigger::Animation(AnimationKind::Phoenix)
            ]
        );
        assert!(poller.take_notification_request());

        let events = poller.drain_animation_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AnimationKind::Phoenix);
        assert_eq!(events[0].host(), Some("my-server"));

        // Everything was consumed
        assert!(check_triggers(&triggers, &poller).await.is_empty());
    }

    #[tokio::test]
    async fn animation_trigger_without_hosts_is_consumed_quietly() {
        let poller = Poller::builder(Arc::new(MockTransport::new())).build();
        let triggers = MemoryTriggers::new();
        triggers.raise("trigger_spawn");

        let fired = check_triggers(&triggers, &poller).await;
        assert_eq!(fired, vec![Trigger::Animation(AnimationKind::Spawn)]);
        assert!(poller.drain_animation_events().is_empty());
        assert!(!triggers.is_raised("trigger_spawn"));
    }
}
