//! Error types for polling.

use hostwatch_adapters::TransportError;
use thiserror::Error;

/// A poll cycle that could not produce a snapshot.
///
/// Only ever seen by the poll loop, which logs it and keeps the previous
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitoringError {
    /// Every attempt failed.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: TransportError,
    },
}

impl MonitoringError {
    /// The error of the final attempt.
    pub fn last_error(&self) -> &TransportError {
        match self {
            MonitoringError::Exhausted { last, .. } => last,
        }
    }
}

/// Misuse of the poller lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollerError {
    /// `start()` was called outside a tokio runtime.
    #[error("no tokio runtime available to spawn the poll task")]
    NoRuntime,
}
