//! Subscriber registry.
//!
//! # Responsibilities
//! - Hand out subscriber ids that are never reused
//! - Map ids to the raw channel the sink delivers into
//!
//! # Design Decisions
//! - `DashMap` keeps registration and fan-out from contending on one lock
//! - Iteration is weakly consistent: entries added or removed while a
//!   `for_each` is running may or may not be visited

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::fanout::record::Sequenced;

/// Identifier of a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) type RawSender = mpsc::Sender<Sequenced>;

/// Concurrent map of subscriber id to raw outbound channel.
pub struct SubscriberRegistry {
    entries: DashMap<SubscriberId, RawSender>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn register(&self, sender: RawSender) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(id, sender);
        id
    }

    /// Remove `id`. Unknown or already-removed ids are ignored.
    ///
    /// Returns whether an entry was removed by this call.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Visit every entry present when the shard is reached.
    ///
    /// The visitor runs under a shard read lock and must not register or
    /// unregister.
    pub(crate) fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(SubscriberId, &RawSender),
    {
        for entry in self.entries.iter() {
            visit(*entry.key(), entry.value());
        }
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_never_reused() {
        let registry = SubscriberRegistry::new();
        let (tx, _rx) = mpsc::channel(1);

        let a = registry.register(tx.clone());
        let b = registry.register(tx.clone());
        assert_ne!(a, b);

        registry.unregister(a);
        registry.unregister(b);
        let c = registry.register(tx);
        assert!(c > b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        let id = registry.register(tx);

        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_for_each_visits_all_entries() {
        let registry = SubscriberRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        let ids: Vec<_> = (0..5).map(|_| registry.register(tx.clone())).collect();

        let mut seen = Vec::new();
        registry.for_each(|id, _| seen.push(id));
        seen.sort();
        assert_eq!(seen, ids);
    }

    #[test]
    fn test_concurrent_register_and_unregister() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(SubscriberRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let (tx, _rx) = mpsc::channel(1);
                    for _ in 0..200 {
                        let id = registry.register(tx.clone());
                        registry.for_each(|_, _| {});
                        registry.unregister(id);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(registry.is_empty());
    }
}
