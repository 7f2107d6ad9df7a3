//! # hostwatch
//!
//! Console front end for the hostwatch poller.
//!
//! The heavy lifting lives in the workspace crates:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          hostwatch                           │
//! │   settings ──▶ Poller ──▶ drain events ──▶ render (console)  │
//! │                  ▲                                           │
//! │                  │ hostwatch-sdk: retry, detector, state     │
//! │                  │                                           │
//! │        hostwatch-adapters: CheckMK transport                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: layered configuration (defaults, file, environment)
//! - **[`render`]**: host table, event lines and the JSON export
//!
//! ## Usage
//!
//! ```bash
//! # Watch a CheckMK site, printing state changes as they happen
//! HOSTWATCH_SECRET=... hostwatch --endpoint http://monitor:5000/cmk
//!
//! # Poll once and dump the host list as JSON
//! hostwatch --config hostwatch.toml --export hosts.json
//! ```
//!
//! ### Rendering a poll as a library
//!
//! ```
//! use std::sync::Arc;
//! use hostwatch::Console;
//! use hostwatch_adapters::MockTransport;
//! use hostwatch_sdk::{HostStatus, Poller};
//!
//! # tokio_test::block_on(async {
//! let transport = Arc::new(MockTransport::new());
//! transport.push_hosts([("srv-db", HostStatus::Critical)]);
//! let poller = Poller::builder(transport).build();
//! poller.poll_once().await.unwrap();
//!
//! let mut console = Console::new();
//! let events = poller.drain_animation_events();
//! for line in console.frame(&poller.get_hosts(), &events, false) {
//!     println!("{line}");
//! }
//! # });
//! ```

pub mod render;
pub mod settings;

pub use render::Console;
pub use settings::Settings;
