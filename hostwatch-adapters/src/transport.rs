//! The transport contract and the raw records it returns.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use hostwatch_types::HostStatus;

use crate::TransportError;

/// Login for the monitoring API.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }
}

// Keep secrets out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Where to fetch host status from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL of the monitoring site (e.g., "http://monitor:5000/cmk").
    pub url: String,
    pub credentials: Credentials,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
        }
    }
}

/// Status as reported by the backend, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatus {
    /// Numeric state column (CheckMK: 0 = UP/OK, 1 = DOWN, ...).
    Code(i64),
    /// Symbolic state name ("OK", "WARN", "CRIT", ...).
    Symbol(String),
}

impl RawStatus {
    /// Interpret the raw value, or `None` if it names no known status.
    pub fn resolve(&self) -> Option<HostStatus> {
        match self {
            RawStatus::Code(code) => HostStatus::from_code(*code),
            RawStatus::Symbol(symbol) => HostStatus::from_symbol(symbol),
        }
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawStatus::Code(code) => write!(f, "{code}"),
            RawStatus::Symbol(symbol) => write!(f, "{symbol:?}"),
        }
    }
}

/// One host entry from a backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHostRecord {
    /// Host identifier.
    pub name: String,
    /// Optional human-readable title.
    pub title: Option<String>,
    pub status: RawStatus,
}

impl RawHostRecord {
    pub fn new(name: impl Into<String>, status: RawStatus) -> Self {
        Self {
            name: name.into(),
            title: None,
            status,
        }
    }

    /// Record with a numeric status code.
    pub fn with_code(name: impl Into<String>, code: i64) -> Self {
        Self::new(name, RawStatus::Code(code))
    }

    /// Record with a symbolic status.
    pub fn with_symbol(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::new(name, RawStatus::Symbol(symbol.into()))
    }

    /// Record for an already-interpreted status.
    pub fn with_status(name: impl Into<String>, status: HostStatus) -> Self {
        Self::with_code(name, status.code() as i64)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Fetches the current host list from a monitoring backend.
///
/// A transport is stateless from the caller's point of view: each call is
/// one request, and a failure says nothing about the next call. Retrying is
/// the caller's business.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Fetch every host the backend knows about.
    ///
    /// `timeout` bounds the whole request.
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Vec<RawHostRecord>, TransportError>;

    /// Returns a human-readable description of the transport.
    fn description(&self) -> &str;
}
