//! The Poller: background fetch loop plus the consumer-facing accessors.

use std::sync::Arc;
use std::time::Duration;

use hostwatch_adapters::{Endpoint, RawHostRecord, Transport};
use hostwatch_types::{
    current_timestamp_ms, AnimationEvent, AnimationKind, HostState, HostStatus, Snapshot,
};
use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::classify::{Classifier, NameClassifier};
use crate::state::StateStore;
use crate::{MonitoringError, PollerError, RetryPolicy, TransitionDetector};

/// Default time between poll cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Default bound on a single fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle phase of a [`Poller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Stopped,
    Running,
    Stopping,
}

/// Polls a monitoring backend in the background and turns state changes
/// into animation events.
///
/// Consumers read the latest snapshot with [`get_hosts`](Self::get_hosts)
/// and take pending animations with
/// [`drain_animation_events`](Self::drain_animation_events). Both are safe to
/// call from any thread while the poll task is running.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use hostwatch_adapters::{CheckMkTransport, Credentials, Endpoint};
/// use hostwatch_sdk::Poller;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let poller = Poller::builder(Arc::new(CheckMkTransport::new()?))
///         .endpoint(Endpoint::new(
///             "http://localhost:5000/cmk",
///             Credentials::new("automation", "secret"),
///         ))
///         .interval(Duration::from_secs(10))
///         .build();
///
///     poller.start()?;
///
///     loop {
///         for event in poller.drain_animation_events() {
///             println!("{event}");
///         }
///         tokio::time::sleep(Duration::from_millis(100)).await;
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Poller {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

#[derive(Debug)]
struct Shared {
    transport: Arc<dyn Transport>,
    classifier: Arc<dyn Classifier>,
    endpoint: Endpoint,
    interval: Duration,
    timeout: Duration,
    retry: RetryPolicy,
    detector: TransitionDetector,
    poll_immediately: bool,
    store: StateStore,
    /// Held from fetch to commit so cycles commit in the order they started.
    cycle: AsyncMutex<()>,
}

#[derive(Debug)]
struct Lifecycle {
    phase: PollerState,
    task: Option<PollTask>,
}

#[derive(Debug)]
struct PollTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Create a builder around the given transport.
    pub fn builder(transport: Arc<dyn Transport>) -> PollerBuilder {
        PollerBuilder::new(transport)
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> PollerState {
        self.lifecycle.lock().phase
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollerState::Running
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.endpoint
    }

    /// Start the background poll task.
    ///
    /// Returns immediately. Calling this while already running does nothing.
    /// Fails with [`PollerError::NoRuntime`] outside a tokio runtime.
    pub fn start(&self) -> Result<(), PollerError> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.phase == PollerState::Running {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PollerError::NoRuntime)?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let shared = self.shared.clone();
        let handle = runtime.spawn(async move { shared.run(stop_rx).await });

        lifecycle.task = Some(PollTask { stop_tx, handle });
        lifecycle.phase = PollerState::Running;
        Ok(())
    }

    /// Stop the background poll task and wait for it to finish.
    ///
    /// A fetch already in flight (including its retries) completes first.
    /// Calling this when stopped does nothing. If an earlier `stop()` was
    /// cancelled before the task finished, this one waits for it instead.
    pub async fn stop(&self) {
        let task = {
            let mut lifecycle = self.lifecycle.lock();
            let phase = lifecycle.phase;
            match phase {
                PollerState::Stopped => return,
                PollerState::Running => lifecycle.phase = PollerState::Stopping,
                PollerState::Stopping => {}
            }
            lifecycle.task.take()
        };

        // Another stop() is already waiting on the task.
        let Some(task) = task else {
            return;
        };
        let _ = task.stop_tx.send(true);

        let mut pending = PendingStop {
            lifecycle: &self.lifecycle,
            task: Some(task),
        };
        if let Some(task) = pending.task.as_mut() {
            if let Err(e) = (&mut task.handle).await {
                warn!(error = %e, "Poll task ended abnormally");
            }
        }
        pending.task = None;

        let mut lifecycle = self.lifecycle.lock();
        // A start() may have raced in while we were waiting.
        if lifecycle.phase == PollerState::Stopping {
            lifecycle.phase = PollerState::Stopped;
        }
    }

    /// Run one poll cycle now, independent of the background task.
    ///
    /// Cycles never overlap: if the background task is mid-fetch, this waits
    /// for it to commit first. Returns the number of events queued.
    pub async fn poll_once(&self) -> Result<usize, MonitoringError> {
        self.shared.poll_once().await
    }

    /// A copy of the last successfully fetched snapshot.
    pub fn get_hosts(&self) -> Snapshot {
        self.shared.store.read()
    }

    /// Hosts of the last snapshot, most important first.
    pub fn hosts_by_priority(&self) -> Vec<HostState> {
        self.get_hosts()
            .by_priority()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Take every pending animation event. Each event is returned once.
    pub fn drain_animation_events(&self) -> Vec<AnimationEvent> {
        self.shared.store.get_animation_queue_and_clear()
    }

    /// Ask the renderer to show a notification.
    pub fn request_notification(&self) {
        self.shared.store.request_notification();
    }

    /// Read and reset the notification request.
    pub fn take_notification_request(&self) -> bool {
        self.shared.store.take_notification_request()
    }

    /// Queue an animation without a state change.
    ///
    /// Per-host kinds target the highest-priority host and are dropped when
    /// no hosts are known. Returns the queued event.
    pub fn inject_event(&self, kind: AnimationKind) -> Option<AnimationEvent> {
        let now = current_timestamp_ms();
        let event = if kind.is_per_host() {
            let snapshot = self.get_hosts();
            let target = snapshot.by_priority().first().map(|h| h.id.clone())?;
            let previous = match kind {
                AnimationKind::Supernova => Some(HostStatus::Ok),
                AnimationKind::Phoenix => Some(HostStatus::Critical),
                _ => None,
            };
            AnimationEvent::for_host(kind, target, previous, now)
        } else {
            AnimationEvent::celebration(now)
        };

        info!(event = %event, "Injected animation");
        self.shared.store.append_events([event.clone()]);
        Some(event)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(task) = self.lifecycle.get_mut().task.take() {
            let _ = task.stop_tx.send(true);
        }
    }
}

/// Hands an unjoined task back to the lifecycle when a `stop()` future is
/// dropped mid-wait, so a later `stop()` can finish the job.
struct PendingStop<'a> {
    lifecycle: &'a Mutex<Lifecycle>,
    task: Option<PollTask>,
}

impl Drop for PendingStop<'_> {
    fn drop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.phase == PollerState::Stopping && lifecycle.task.is_none() {
            lifecycle.task = Some(task);
        }
    }
}

impl Shared {
    async fn run(&self, mut stop_rx: watch::Receiver<bool>) {
        info!(
            transport = self.transport.description(),
            url = %self.endpoint.url,
            interval_ms = self.interval.as_millis() as u64,
            "Poller started"
        );

        if self.poll_immediately && !*stop_rx.borrow() {
            self.poll_cycle().await;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = stop_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            if *stop_rx.borrow() {
                break;
            }

            self.poll_cycle().await;
        }

        info!("Poller stopped");
    }

    async fn poll_cycle(&self) {
        if let Err(e) = self.poll_once().await {
            warn!(error = %e, "Poll cycle failed, keeping previous host states");
        }
    }

    async fn poll_once(&self) -> Result<usize, MonitoringError> {
        let _cycle = self.cycle.lock().await;

        let records = self
            .retry
            .execute(|_| self.transport.fetch(&self.endpoint, self.timeout))
            .await?;

        let now = current_timestamp_ms();
        let snapshot = snapshot_from_records(records, self.classifier.as_ref(), now);
        let hosts = snapshot.len();

        let queued = self.store.commit(snapshot, &self.detector, now);
        debug!(hosts, events = queued, "Poll cycle complete");
        Ok(queued)
    }
}

/// Turn raw transport records into a snapshot.
///
/// Records with an uninterpretable status are skipped. When an identifier
/// repeats, the first record wins.
pub fn snapshot_from_records(
    records: Vec<RawHostRecord>,
    classifier: &dyn Classifier,
    timestamp_ms: u64,
) -> Snapshot {
    let mut snapshot = Snapshot::with_timestamp(timestamp_ms);

    for record in records {
        let Some(status) = record.status.resolve() else {
            warn!(host = %record.name, status = %record.status, "Skipping host with unknown status value");
            continue;
        };

        if snapshot.contains(&record.name) {
            warn!(host = %record.name, "Duplicate host in response, keeping first occurrence");
            continue;
        }

        let zone = classifier.classify(&record.name);
        let mut host = HostState::new(record.name, status, zone, timestamp_ms);
        if let Some(title) = record.title {
            host = host.with_name(title);
        }
        snapshot.insert(host);
    }

    snapshot
}

/// Builder for configuring a [`Poller`].
#[derive(Debug)]
pub struct PollerBuilder {
    transport: Arc<dyn Transport>,
    classifier: Option<Arc<dyn Classifier>>,
    endpoint: Endpoint,
    interval: Option<Duration>,
    timeout: Option<Duration>,
    retry: RetryPolicy,
    detector: TransitionDetector,
    poll_immediately: bool,
}

impl PollerBuilder {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            classifier: None,
            endpoint: Endpoint::default(),
            interval: None,
            timeout: None,
            retry: RetryPolicy::default(),
            detector: TransitionDetector::default(),
            poll_immediately: false,
        }
    }

    /// Set the monitoring endpoint.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the poll interval.
    ///
    /// Defaults to 10 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the per-fetch timeout.
    ///
    /// Defaults to 10 seconds if not specified.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the zone classifier. Defaults to [`NameClassifier`].
    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn detector(mut self, detector: TransitionDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Run the first cycle right after `start()` instead of after one
    /// interval.
    pub fn poll_immediately(mut self, enabled: bool) -> Self {
        self.poll_immediately = enabled;
        self
    }

    /// Build the poller. It starts out stopped with an empty snapshot.
    pub fn build(self) -> Poller {
        let shared = Shared {
            transport: self.transport,
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(NameClassifier)),
            endpoint: self.endpoint,
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retry: self.retry,
            detector: self.detector,
            poll_immediately: self.poll_immediately,
            store: StateStore::new(),
            cycle: AsyncMutex::new(()),
        };

        Poller {
            shared: Arc::new(shared),
            lifecycle: Mutex::new(Lifecycle {
                phase: PollerState::Stopped,
                task: None,
            }),
        }
    }
}
