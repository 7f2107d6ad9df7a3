//! CheckMK transport using the REST API.
//!
//! Queries the host collection endpoint of a CheckMK site, which reports
//! every configured host together with its current state column.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use hostwatch_adapters::{CheckMkTransport, Credentials, Endpoint, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = CheckMkTransport::new()?;
//!     let endpoint = Endpoint::new(
//!         "http://monitor:5000/cmk",
//!         Credentials::new("automation", "secret"),
//!     );
//!
//!     let hosts = transport.fetch(&endpoint, Duration::from_secs(10)).await?;
//!     for host in &hosts {
//!         println!("{}: {}", host.name, host.status);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{Endpoint, RawHostRecord, RawStatus, Transport, TransportError};

/// Path of the host collection below the site URL.
const HOST_COLLECTION_PATH: &str = "/check_mk/api/1.0/domain-types/host/collections/all";

/// Transport for the CheckMK REST API.
#[derive(Debug, Clone)]
pub struct CheckMkTransport {
    client: Client,
}

impl CheckMkTransport {
    /// Create a transport with default client settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    /// Create a new builder for configuring the transport.
    pub fn builder() -> CheckMkTransportBuilder {
        CheckMkTransportBuilder::default()
    }

    /// Full URL of the host collection for a site.
    pub fn collection_url(endpoint: &Endpoint) -> String {
        format!("{}{}", endpoint.url.trim_end_matches('/'), HOST_COLLECTION_PATH)
    }
}

#[async_trait]
impl Transport for CheckMkTransport {
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Vec<RawHostRecord>, TransportError> {
        let url = Self::collection_url(endpoint);
        let creds = &endpoint.credentials;

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .bearer_auth(format!("{} {}", creds.user, creds.secret))
            .query(&[("columns", "state")])
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Auth(format!(
                "{} rejected user '{}'",
                status, creds.user
            )));
        }

        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_host_collection(&body)
    }

    fn description(&self) -> &str {
        "checkmk"
    }
}

/// Builder for CheckMkTransport.
#[derive(Debug, Default)]
pub struct CheckMkTransportBuilder {
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl CheckMkTransportBuilder {
    /// Set the TCP connect timeout (default: 5 seconds).
    ///
    /// The overall request timeout is passed per fetch.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<CheckMkTransport, TransportError> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("hostwatch/", env!("CARGO_PKG_VERSION")).to_string());

        let client = Client::builder()
            .connect_timeout(self.connect_timeout.unwrap_or(Duration::from_secs(5)))
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(CheckMkTransport { client })
    }
}

/// Host collection response body.
#[derive(Debug, Deserialize)]
struct HostCollection {
    value: Vec<Value>,
}

/// Parse a host collection response.
///
/// A body that is not a host collection at all fails the whole fetch.
/// Individual entries that cannot be interpreted are skipped with a warning
/// so that one broken host does not hide all the others.
pub fn parse_host_collection(body: &[u8]) -> Result<Vec<RawHostRecord>, TransportError> {
    let collection: HostCollection = serde_json::from_slice(body)?;

    let mut records = Vec::with_capacity(collection.value.len());
    for (index, entry) in collection.value.iter().enumerate() {
        match parse_host_entry(entry) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(index, reason = %reason, "Skipping malformed host record");
            }
        }
    }

    Ok(records)
}

fn parse_host_entry(entry: &Value) -> Result<RawHostRecord, String> {
    let name = entry
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing host id".to_string())?;

    let state = entry
        .get("extensions")
        .and_then(|ext| ext.get("state"))
        .ok_or_else(|| format!("host '{name}' has no state"))?;

    let status = match state {
        Value::Number(n) => n
            .as_i64()
            .map(RawStatus::Code)
            .ok_or_else(|| format!("host '{name}' has non-integer state {n}"))?,
        Value::String(s) => RawStatus::Symbol(s.clone()),
        other => return Err(format!("host '{name}' has unsupported state {other}")),
    };

    let title = entry
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty() && *t != name)
        .map(str::to_string);

    Ok(RawHostRecord {
        name: name.to_string(),
        title,
        status,
    })
}
