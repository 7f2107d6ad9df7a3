//! # hostwatch-sdk
//!
//! Background poller and state-transition detector for monitored hosts.
//!
//! A [`Poller`] fetches host states from a monitoring backend on a fixed
//! interval, keeps the last good snapshot through outages, and turns every
//! state change into an [`AnimationEvent`] for a renderer to play.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use hostwatch_adapters::{CheckMkTransport, Credentials, Endpoint};
//! use hostwatch_sdk::Poller;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let poller = Poller::builder(Arc::new(CheckMkTransport::new()?))
//!         .endpoint(Endpoint::new(
//!             "http://localhost:5000/cmk",
//!             Credentials::new("automation", "secret"),
//!         ))
//!         .poll_immediately(true)
//!         .build();
//!
//!     // Start background polling (non-blocking)
//!     poller.start()?;
//!
//!     tokio::time::sleep(Duration::from_secs(30)).await;
//!     for host in poller.hosts_by_priority() {
//!         println!("{:<24} {}", host.name, host.status);
//!     }
//!     for event in poller.drain_animation_events() {
//!         println!("{event}");
//!     }
//!
//!     poller.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Stale-but-valid**: a failed poll never touches the last snapshot
//! - **Bounded retries**: three attempts with 1s/2s backoff by default
//! - **Edge-triggered events**: SUPERNOVA, PHOENIX, WARNING, BLACKHOLE,
//!   SPAWN and CELEBRATION
//! - **Thread-safe**: read and drain from any thread or async task

mod classify;
mod detector;
mod error;
mod poller;
mod retry;
mod state;
mod triggers;

pub use classify::{Classifier, FixedClassifier, NameClassifier};
pub use detector::TransitionDetector;
pub use error::{MonitoringError, PollerError};
pub use poller::{
    snapshot_from_records, Poller, PollerBuilder, PollerState, DEFAULT_INTERVAL, DEFAULT_TIMEOUT,
};
pub use retry::RetryPolicy;
pub use state::StateStore;
pub use triggers::{check_triggers, FileTriggers, MemoryTriggers, Trigger, TriggerSource};

// Re-export types for convenience
pub use hostwatch_types::{AnimationEvent, AnimationKind, HostState, HostStatus, Snapshot, Zone};
