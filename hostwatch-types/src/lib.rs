//! # hostwatch-types
//!
//! Core types for host status monitoring. This crate defines the values that
//! flow between the monitoring poller and whatever renders its output: host
//! states, point-in-time snapshots of every known host, and the animation
//! events produced when hosts change state.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON export
//! - **Immutable snapshots**: A [`Snapshot`] is replaced wholesale, never patched
//! - **Ergonomic builders**: Fluent API for constructing snapshots in tests and tools
//!
//! ## Features
//!
//! - `serde`: JSON/YAML/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use hostwatch_types::{HostStatus, Snapshot};
//!
//! let snapshot = Snapshot::builder()
//!     .timestamp_ms(1703160000000)
//!     .host("web-server-01", HostStatus::Ok)
//!     .host("core-router", HostStatus::Warning)
//!     .build();
//!
//! assert_eq!(snapshot.len(), 2);
//! assert!(!snapshot.all_ok());
//! ```

mod event;
mod host;
mod snapshot;

pub use event::*;
pub use host::*;
pub use snapshot::*;

/// Get current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
