//! Bounded history of recent records.
//!
//! # Responsibilities
//! - Keep the most recent `capacity` records, oldest evicted first
//! - Serve "last N" queries in chronological order
//! - Number every appended record so replay can be de-duplicated against live
//!   delivery
//!
//! # Design Decisions
//! - Fixed slot array plus offset/size instead of a growable queue; the
//!   allocation happens once at construction
//! - One mutex guards offset, size, slots and the sequence counter together

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::fanout::record::LogRecord;

/// Capacity used when the caller asks for zero.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Fixed-capacity circular buffer of log records.
pub struct HistoryRing {
    inner: Mutex<RingState>,
    capacity: usize,
}

struct RingState {
    slots: Vec<Option<Slot>>,
    /// Index of the oldest retained slot.
    offset: usize,
    size: usize,
    next_seq: u64,
}

struct Slot {
    seq: u64,
    record: LogRecord,
}

/// Result of a history read taken while subscribing.
#[derive(Debug, Default)]
pub(crate) struct HistorySnapshot {
    pub records: Vec<LogRecord>,
    /// Sequence number of the newest retained record at snapshot time.
    pub last_seq: Option<u64>,
}

impl HistoryRing {
    /// Create a ring holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            capacity
        };
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            inner: Mutex::new(RingState {
                slots,
                offset: 0,
                size: 0,
                next_seq: 1,
            }),
            capacity,
        }
    }

    /// Store a copy of `record`, evicting the oldest entry when full.
    ///
    /// Returns the sequence number assigned to the record.
    pub fn append(&self, record: &[u8]) -> u64 {
        let record = LogRecord::copy_from(record);
        let mut state = self.lock();
        let seq = state.next_seq;
        state.next_seq += 1;

        if state.size < self.capacity {
            let idx = (state.offset + state.size) % self.capacity;
            state.slots[idx] = Some(Slot { seq, record });
            state.size += 1;
        } else {
            let idx = state.offset;
            state.slots[idx] = Some(Slot { seq, record });
            state.offset = (state.offset + 1) % self.capacity;
        }
        seq
    }

    /// Up to `limit` of the most recent records, oldest first.
    ///
    /// A `limit` of zero, or one larger than the current size, returns every
    /// retained record.
    pub fn recent(&self, limit: usize) -> Vec<LogRecord> {
        self.snapshot(limit).records
    }

    pub(crate) fn snapshot(&self, limit: usize) -> HistorySnapshot {
        let state = self.lock();
        if state.size == 0 {
            return HistorySnapshot::default();
        }
        let limit = if limit == 0 || limit > state.size {
            state.size
        } else {
            limit
        };

        let newest = (state.offset + state.size - 1) % self.capacity;
        let last_seq = state.slots[newest].as_ref().map(|slot| slot.seq);

        let records = (state.size - limit..state.size)
            .filter_map(|i| state.slots[(state.offset + i) % self.capacity].as_ref())
            .map(|slot| slot.record.clone())
            .collect();
        HistorySnapshot { records, last_seq }
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.lock().size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, RingState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(records: Vec<LogRecord>) -> Vec<String> {
        records.iter().map(|r| r.to_string_lossy()).collect()
    }

    #[test]
    fn test_empty_ring_returns_nothing() {
        let ring = HistoryRing::new(4);
        assert!(ring.recent(0).is_empty());
        assert!(ring.recent(10).is_empty());
        assert!(ring.is_empty());
    }

    #[test]
    fn test_zero_capacity_uses_default() {
        let ring = HistoryRing::new(0);
        assert_eq!(ring.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_recent_before_wrap() {
        let ring = HistoryRing::new(4);
        ring.append(b"a");
        ring.append(b"b");
        ring.append(b"c");

        assert_eq!(strings(ring.recent(0)), vec!["a", "b", "c"]);
        assert_eq!(strings(ring.recent(2)), vec!["b", "c"]);
        assert_eq!(strings(ring.recent(99)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_keeps_last_capacity_records_after_wrap() {
        let ring = HistoryRing::new(3);
        for i in 0..10 {
            ring.append(format!("msg {}", i).as_bytes());
        }

        assert_eq!(ring.len(), 3);
        assert_eq!(strings(ring.recent(3)), vec!["msg 7", "msg 8", "msg 9"]);
        assert_eq!(strings(ring.recent(2)), vec!["msg 8", "msg 9"]);
        assert_eq!(strings(ring.recent(1)), vec!["msg 9"]);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let ring = HistoryRing::new(2);
        assert_eq!(ring.append(b"a"), 1);
        assert_eq!(ring.append(b"b"), 2);
        assert_eq!(ring.append(b"c"), 3);

        let snapshot = ring.snapshot(1);
        assert_eq!(strings(snapshot.records), vec!["c"]);
        assert_eq!(snapshot.last_seq, Some(3));
    }

    #[test]
    fn test_snapshot_reads_newest_slot_across_wrap() {
        let ring = HistoryRing::new(4);
        ring.append(b"a");
        ring.append(b"b");
        assert_eq!(ring.snapshot(1).last_seq, Some(2));

        for r in [b"c", b"d", b"e", b"f"] {
            ring.append(r);
        }
        let snapshot = ring.snapshot(2);
        assert_eq!(strings(snapshot.records), vec!["e", "f"]);
        assert_eq!(snapshot.last_seq, Some(6));
        assert_eq!(ring.snapshot(0).records.len(), 4);
    }

    #[test]
    fn test_returned_records_are_copies() {
        let ring = HistoryRing::new(2);
        let mut buf = b"original".to_vec();
        ring.append(&buf);
        buf.copy_from_slice(b"mutated!");

        let mut first = ring.recent(1).remove(0).into_bytes();
        first[0] = b'X';

        assert_eq!(strings(ring.recent(1)), vec!["original"]);
    }

    #[test]
    fn test_concurrent_append_and_read() {
        use std::sync::Arc;
        use std::thread;

        let ring = Arc::new(HistoryRing::new(64));
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let ring = ring.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        ring.append(format!("{}-{}", t, i).as_bytes());
                    }
                })
            })
            .collect();

        let reader = {
            let ring = ring.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let records = ring.recent(0);
                    assert!(records.len() <= 64);
                    assert!(records.iter().all(|r| !r.is_empty()));
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(ring.len(), 64);
    }
}
