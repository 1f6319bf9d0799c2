//! Filtered, replay-primed subscriptions.
//!
//! # Data Flow
//! ```text
//! subscribe(opts)
//!     → register raw channel with the sink   (live records start queuing)
//!     → snapshot history                      (newest sequence = watermark)
//!     → replay snapshot into caller channel   (try_send, stop when full)
//!     → spawn forwarder (runtime task, or a thread outside a runtime):
//!           raw channel → skip seq <= watermark → level filter → try_send
//! ```
//!
//! # Design Decisions
//! - Registration precedes the snapshot so no concurrent live record is
//!   missed; the watermark keeps records that made it into the snapshot from
//!   being delivered a second time
//! - The caller's sender sits behind a mutex that cancellation empties, so
//!   once `cancel` returns nothing else reaches the caller's channel
//! - The caller keeps its receiver after cancellation and can drain it

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::fanout::filter;
use crate::fanout::record::{LogRecord, Sequenced};
use crate::fanout::registry::SubscriberId;
use crate::fanout::sink::MulticastSink;
use crate::observability::level::Severity;
use crate::observability::metrics;

/// Channel capacity used when a subscriber asks for zero.
pub const DEFAULT_BUFFER_SIZE: usize = 128;

/// Parameters of a subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Capacity of the returned channel. Zero selects the manager default.
    pub buffer_size: usize,
    /// How many recent records to deliver before live ones. Zero disables replay.
    pub replay: usize,
    /// Minimum severity. `None` passes everything.
    pub min_level: Option<Severity>,
}

impl SubscribeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_replay(mut self, replay: usize) -> Self {
        self.replay = replay;
        self
    }

    pub fn with_min_level(mut self, min_level: Option<Severity>) -> Self {
        self.min_level = min_level;
        self
    }

    /// Set the minimum level from user input; unknown names disable filtering.
    pub fn with_min_level_str(self, min_level: &str) -> Self {
        self.with_min_level(Severity::parse_filter(min_level))
    }
}

/// Creates subscriptions on top of a [`MulticastSink`].
pub struct SubscriptionManager {
    sink: Arc<MulticastSink>,
    default_buffer: usize,
}

impl SubscriptionManager {
    pub fn new(sink: Arc<MulticastSink>, default_buffer: usize) -> Self {
        let default_buffer = if default_buffer == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            default_buffer
        };
        Self {
            sink,
            default_buffer,
        }
    }

    /// Open a subscription.
    ///
    /// The forwarder runs as a task on the current Tokio runtime, or on its
    /// own thread when there is none.
    pub fn subscribe(&self, opts: SubscribeOptions) -> Subscription {
        let buffer = if opts.buffer_size == 0 {
            self.default_buffer
        } else {
            opts.buffer_size
        };

        let (raw_tx, raw_rx) = mpsc::channel(buffer);
        let (out_tx, out_rx) = mpsc::channel(buffer);
        let id = self.sink.register(raw_tx);

        let shared = Arc::new(Shared {
            id,
            sink: self.sink.clone(),
            output: Mutex::new(Some(out_tx)),
            stop: Notify::new(),
        });

        let watermark = if opts.replay > 0 {
            let snapshot = self.sink.snapshot(opts.replay);
            shared.replay(snapshot.records, opts.min_level);
            snapshot.last_seq
        } else {
            None
        };

        let route = Route {
            min_level: opts.min_level,
            watermark,
        };
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(forward(shared.clone(), raw_rx, route));
            }
            Err(_) => {
                let worker = shared.clone();
                let spawned = thread::Builder::new()
                    .name(format!("log-subscriber-{}", id))
                    .spawn(move || forward_blocking(worker, raw_rx, route));
                if let Err(e) = spawned {
                    tracing::warn!(subscriber = %id, error = %e, "Failed to start log subscription forwarder");
                    shared.cancel();
                }
            }
        }

        tracing::debug!(
            subscriber = %id,
            buffer,
            replay = opts.replay,
            min_level = ?opts.min_level,
            "Log subscription registered"
        );

        Subscription {
            receiver: out_rx,
            handle: SubscriptionHandle { shared },
        }
    }

    pub fn sink(&self) -> &Arc<MulticastSink> {
        &self.sink
    }

    pub fn default_buffer(&self) -> usize {
        self.default_buffer
    }
}

enum Delivery {
    Sent,
    Dropped,
    Closed,
}

struct Shared {
    id: SubscriberId,
    sink: Arc<MulticastSink>,
    /// `None` once cancelled.
    output: Mutex<Option<mpsc::Sender<LogRecord>>>,
    stop: Notify,
}

impl Shared {
    fn lock_output(&self) -> MutexGuard<'_, Option<mpsc::Sender<LogRecord>>> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, record: LogRecord) -> Delivery {
        let output = self.lock_output();
        let Some(tx) = output.as_ref() else {
            return Delivery::Closed;
        };
        match tx.try_send(record) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => Delivery::Dropped,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    fn replay(&self, records: Vec<LogRecord>, min_level: Option<Severity>) {
        let mut pending = records
            .into_iter()
            .filter(|r| filter::accept(r, min_level));
        while let Some(record) = pending.next() {
            match self.deliver(record) {
                Delivery::Sent => {}
                Delivery::Dropped => {
                    // Caller buffer saturated: the rest of the burst is dropped too.
                    metrics::record_dropped("replay", 1 + pending.count() as u64);
                    return;
                }
                Delivery::Closed => return,
            }
        }
    }

    fn cancel(&self) -> bool {
        let Some(tx) = self.lock_output().take() else {
            return false;
        };
        drop(tx);
        self.sink.unregister(self.id);
        self.stop.notify_one();
        true
    }

    fn is_active(&self) -> bool {
        self.lock_output().is_some()
    }
}

/// Per-subscription forwarding rules.
#[derive(Debug, Clone, Copy)]
struct Route {
    min_level: Option<Severity>,
    /// Newest sequence already delivered by replay.
    watermark: Option<u64>,
}

impl Shared {
    /// Forward one live record. Returns `false` once the caller side is gone.
    fn forward_one(&self, item: Sequenced, route: Route) -> bool {
        if route.watermark.is_some_and(|w| item.seq <= w) {
            return true;
        }
        if !filter::accept(&item.record, route.min_level) {
            return true;
        }
        match self.deliver(item.record) {
            Delivery::Sent => true,
            Delivery::Dropped => {
                metrics::record_dropped("forward", 1);
                true
            }
            Delivery::Closed => false,
        }
    }

    fn finish(&self) {
        // No-op after an explicit cancel.
        self.cancel();
        tracing::trace!(subscriber = %self.id, "Log subscription forwarder stopped");
    }
}

async fn forward(shared: Arc<Shared>, mut raw: mpsc::Receiver<Sequenced>, route: Route) {
    loop {
        tokio::select! {
            biased;
            _ = shared.stop.notified() => break,
            item = raw.recv() => {
                // All senders gone: our registry entry was removed.
                let Some(item) = item else { break };
                if !shared.forward_one(item, route) {
                    break;
                }
            }
        }
    }
    shared.finish();
}

/// Forwarder for subscriptions opened outside a Tokio runtime.
///
/// Cancellation unregisters the raw sender, which ends `blocking_recv`.
fn forward_blocking(shared: Arc<Shared>, mut raw: mpsc::Receiver<Sequenced>, route: Route) {
    while let Some(item) = raw.blocking_recv() {
        if !shared.forward_one(item, route) {
            break;
        }
    }
    shared.finish();
}

/// Cloneable cancellation handle for a [`Subscription`].
#[derive(Clone)]
pub struct SubscriptionHandle {
    shared: Arc<Shared>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriberId {
        self.shared.id
    }

    /// Stop the subscription. Only the first call has any effect.
    pub fn cancel(&self) {
        if self.shared.cancel() {
            tracing::debug!(subscriber = %self.shared.id, "Log subscription cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }
}

/// A live, filtered view of the log stream.
///
/// Dropping the subscription cancels it.
pub struct Subscription {
    receiver: mpsc::Receiver<LogRecord>,
    handle: SubscriptionHandle,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.handle.id()
    }

    /// Wait for the next record.
    ///
    /// Returns `None` once the subscription is cancelled and its buffer is drained.
    pub async fn recv(&mut self) -> Option<LogRecord> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<LogRecord, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Blocking variant of [`recv`](Self::recv) for threads outside a runtime.
    ///
    /// Panics when called from within an async context.
    pub fn blocking_recv(&mut self) -> Option<LogRecord> {
        self.receiver.blocking_recv()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}
