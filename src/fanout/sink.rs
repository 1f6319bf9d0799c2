//! Multicast sink: the single write entry point of the fan-out core.
//!
//! # Data Flow
//! ```text
//! write(record)
//!     → HistoryRing::append (copy, sequence number)
//!     → for each registered subscriber: copy → try_send
//!         Ok      → delivered
//!         Full    → dropped for that subscriber
//!         Closed  → pruned from the registry after the pass
//! ```
//!
//! # Design Decisions
//! - Never blocks on a subscriber and never reports fan-out failures
//! - Never emits `tracing` events: it sits underneath the tracing writer

use std::io;

use tokio::sync::mpsc::error::TrySendError;

use crate::fanout::record::{LogRecord, Sequenced};
use crate::fanout::registry::{RawSender, SubscriberId, SubscriberRegistry};
use crate::fanout::ring::{HistoryRing, HistorySnapshot};
use crate::observability::metrics;

/// Appends every record to history and multicasts it to subscribers.
pub struct MulticastSink {
    history: HistoryRing,
    registry: SubscriberRegistry,
}

impl MulticastSink {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: HistoryRing::new(history_capacity),
            registry: SubscriberRegistry::new(),
        }
    }

    /// Publish one record. Always succeeds.
    ///
    /// Returns the number of bytes accepted, which is the whole record.
    pub fn publish(&self, record: &[u8]) -> usize {
        if record.is_empty() {
            return 0;
        }
        let seq = self.history.append(record);
        metrics::record_write();

        let mut closed: Vec<SubscriberId> = Vec::new();
        self.registry.for_each(|id, sender| {
            let item = Sequenced {
                seq,
                record: LogRecord::copy_from(record),
            };
            match sender.try_send(item) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => metrics::record_dropped("live", 1),
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        });

        if !closed.is_empty() {
            let pruned = closed
                .into_iter()
                .filter(|id| self.registry.unregister(*id))
                .count();
            metrics::record_pruned(pruned);
            metrics::record_subscriber_count(self.registry.len());
        }
        record.len()
    }

    /// Up to `limit` most recent records, oldest first. Zero means all.
    pub fn recent(&self, limit: usize) -> Vec<LogRecord> {
        self.history.recent(limit)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.registry.contains(id)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    pub(crate) fn register(&self, sender: RawSender) -> SubscriberId {
        let id = self.registry.register(sender);
        metrics::record_subscriber_count(self.registry.len());
        id
    }

    pub(crate) fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self.registry.unregister(id);
        if removed {
            metrics::record_subscriber_count(self.registry.len());
        }
        removed
    }

    pub(crate) fn snapshot(&self, limit: usize) -> HistorySnapshot {
        self.history.snapshot(limit)
    }
}

impl io::Write for &MulticastSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.publish(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for MulticastSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.publish(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
