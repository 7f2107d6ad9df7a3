//! # hostwatch-adapters
//!
//! Transports for fetching host status from monitoring backends.
//!
//! A [`Transport`] performs exactly one request and returns the raw host
//! records it found, or a [`TransportError`]. Retrying, diffing and storing
//! results are left to `hostwatch-sdk`.
//!
//! ## Supported Systems
//!
//! - **CheckMK** (`checkmk` feature, on by default) - Reads host states from
//!   the REST API host collection
//! - **Mock** - A scripted transport for tests, always available
//!
//! ## Quick Start (CheckMK)
//!
//! ```rust,no_run
//! use hostwatch_adapters::{CheckMkTransport, Credentials, Endpoint, Transport};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = CheckMkTransport::new()?;
//!     let endpoint = Endpoint::new(
//!         "http://localhost:5000/cmk",
//!         Credentials::new("automation", "secret"),
//!     );
//!
//!     let hosts = transport.fetch(&endpoint, Duration::from_secs(10)).await?;
//!     println!("Fetched {} hosts", hosts.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mock;
pub mod transport;

#[cfg(feature = "checkmk")]
pub mod checkmk;

pub use error::TransportError;
pub use mock::MockTransport;
pub use transport::{Credentials, Endpoint, RawHostRecord, RawStatus, Transport};

#[cfg(feature = "checkmk")]
pub use checkmk::{parse_host_collection, CheckMkTransport, CheckMkTransportBuilder};

// Re-export types for convenience
pub use hostwatch_types::HostStatus;
