//! Scripted transport for tests.
//!
//! Responses are handed out in the order they were pushed. Once the script
//! runs dry, every further call gets the fallback response.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hostwatch_types::HostStatus;
use parking_lot::Mutex;

use crate::{Endpoint, RawHostRecord, Transport, TransportError};

type Response = Result<Vec<RawHostRecord>, TransportError>;

/// A deterministic [`Transport`] that replays queued responses.
///
/// # Example
///
/// ```rust
/// use hostwatch_adapters::{MockTransport, RawHostRecord, TransportError};
///
/// let transport = MockTransport::new();
/// transport.push_err(TransportError::Timeout);
/// transport.push_ok(vec![RawHostRecord::with_code("web-1", 0)]);
/// ```
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<Response>>,
    fallback: Mutex<Response>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// An empty script whose fallback is an empty host list.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Ok(Vec::new())),
            latency: None,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// A transport that always returns the same hosts.
    pub fn always(records: Vec<RawHostRecord>) -> Self {
        let transport = Self::new();
        transport.set_fallback(Ok(records));
        transport
    }

    /// A transport that always fails with the same error.
    pub fn failing(err: TransportError) -> Self {
        let transport = Self::new();
        transport.set_fallback(Err(err));
        transport
    }

    /// Sleep for `latency` before answering each call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a successful response.
    pub fn push_ok(&self, records: Vec<RawHostRecord>) -> &Self {
        self.script.lock().push_back(Ok(records));
        self
    }

    /// Queue a successful response built from `(name, status)` pairs.
    pub fn push_hosts<'a>(&self, hosts: impl IntoIterator<Item = (&'a str, HostStatus)>) -> &Self {
        let records = hosts
            .into_iter()
            .map(|(name, status)| RawHostRecord::with_status(name, status))
            .collect();
        self.push_ok(records)
    }

    /// Queue a failed response.
    pub fn push_err(&self, err: TransportError) -> &Self {
        self.script.lock().push_back(Err(err));
        self
    }

    /// Replace the response used once the script is exhausted.
    pub fn set_fallback(&self, response: Response) {
        *self.fallback.lock() = response;
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }

    /// Endpoint URLs seen, in call order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    fn next_response(&self) -> Response {
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.lock().clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, endpoint: &Endpoint, _timeout: Duration) -> Response {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push(endpoint.url.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.next_response()
    }

    fn description(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Credentials, RawStatus};

    fn endpoint() -> Endpoint {
        Endpoint::new("http://mock", Credentials::default())
    }

    #[tokio::test]
    async fn replays_script_then_fallback() {
        let transport = MockTransport::new();
        transport
            .push_err(TransportError::Timeout)
            .push_hosts([("a", HostStatus::Critical)]);

        let timeout = Duration::from_secs(1);
        assert_eq!(
            transport.fetch(&endpoint(), timeout).await,
            Err(TransportError::Timeout)
        );

        let records = transport.fetch(&endpoint(), timeout).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RawStatus::Code(2));

        assert_eq!(transport.fetch(&endpoint(), timeout).await, Ok(vec![]));
        assert_eq!(transport.calls(), 3);
        assert_eq!(transport.remaining(), 0);
        assert_eq!(transport.requested_urls(), vec!["http://mock"; 3]);
    }

    #[tokio::test]
    async fn failing_transport_never_recovers() {
        let transport = MockTransport::failing(TransportError::Status(500));
        for _ in 0..3 {
            assert_eq!(
                transport.fetch(&endpoint(), Duration::from_secs(1)).await,
                Err(TransportError::Status(500))
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied() {
        let transport = MockTransport::always(vec![]).with_latency(Duration::from_secs(3));
        let started = tokio::time::Instant::now();
        transport
            .fetch(&endpoint(), Duration::from_secs(10))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
    }
}
