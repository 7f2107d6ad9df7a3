//! Plain-text rendering of hosts and animation events.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use hostwatch_types::{AnimationEvent, AnimationKind, HostState, HostStatus, Snapshot};

/// One-line label shown next to each event.
fn event_icon(kind: AnimationKind) -> &'static str {
    match kind {
        AnimationKind::Supernova => "💥",
        AnimationKind::Phoenix => "🔥",
        AnimationKind::Warning => "⚠️ ",
        AnimationKind::Blackhole => "🕳️ ",
        AnimationKind::Spawn => "✨",
        AnimationKind::Celebration => "🎉",
    }
}

pub fn render_event(event: &AnimationEvent) -> String {
    format!("{} {}", event_icon(event.kind), event)
}

/// Hosts as an aligned table, in the order given.
pub fn render_host_table(hosts: &[&HostState]) -> String {
    let width = hosts
        .iter()
        .map(|h| h.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {:<width$} ZONE", "STATUS", "HOST");
    for host in hosts {
        let _ = writeln!(out, "{:<6} {:<width$} {}", host.status.symbol(), host.name, host.zone);
    }
    out
}

/// One-line status tally, e.g. `12 hosts: 10 OK, 1 WARN, 1 CRIT, 0 UNKN`.
pub fn render_summary(snapshot: &Snapshot) -> String {
    format!(
        "{} hosts: {} OK, {} WARN, {} CRIT, {} UNKN",
        snapshot.len(),
        snapshot.count(HostStatus::Ok),
        snapshot.count(HostStatus::Warning),
        snapshot.count(HostStatus::Critical),
        snapshot.count(HostStatus::Unknown),
    )
}

/// Console output state: remembers what was last printed so the host table
/// is only repeated when something in it changed.
#[derive(Debug, Default)]
pub struct Console {
    last_table: Option<Vec<(String, HostStatus)>>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for this refresh.
    pub fn frame(
        &mut self,
        snapshot: &Snapshot,
        events: &[AnimationEvent],
        notification: bool,
    ) -> Vec<String> {
        let mut lines = Vec::new();

        let table: Vec<(String, HostStatus)> = snapshot
            .iter()
            .map(|(id, host)| (id.clone(), host.status))
            .collect();
        if !snapshot.is_empty() && self.last_table.as_ref() != Some(&table) {
            lines.push(render_summary(snapshot));
            lines.push(render_host_table(&snapshot.by_priority()));
            self.last_table = Some(table);
        }

        lines.extend(events.iter().map(render_event));

        if notification {
            lines.push("🔔 notification".to_string());
        }

        lines
    }
}

/// JSON document written by `--export`.
pub fn export_json(snapshot: &Snapshot, endpoint: &str) -> serde_json::Value {
    let hosts: Vec<&HostState> = snapshot.by_priority();

    serde_json::json!({
        "endpoint": endpoint,
        "timestamp_ms": snapshot.timestamp_ms,
        "summary": {
            "total": snapshot.len(),
            "ok": snapshot.count(HostStatus::Ok),
            "warning": snapshot.count(HostStatus::Warning),
            "critical": snapshot.count(HostStatus::Critical),
            "unknown": snapshot.count(HostStatus::Unknown),
            "all_ok": snapshot.all_ok(),
        },
        "hosts": hosts,
    })
}

pub fn write_export(path: &Path, snapshot: &Snapshot, endpoint: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_json(snapshot, endpoint))?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write export to {}", path.display()))
}
