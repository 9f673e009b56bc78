//! Bounded in-memory history of completed invocations.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::history::HistoryEntry;

/// Number of entries kept unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

/// FIFO of the most recent history entries, newest first.
///
/// Volatile: contents live as long as the process. All operations take the
/// same lock, so eviction and insertion happen in one critical section and a
/// reader never sees more than `capacity` entries.
#[derive(Debug)]
pub struct HistoryLedger {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLedger {
    /// Create an empty ledger with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty ledger holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        // Entries are plain data; a panicking writer cannot leave them torn
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert at the front, evicting the oldest entries past capacity.
    pub fn append(&self, entry: HistoryEntry) {
        let mut entries = self.lock();
        entries.push_front(entry);
        while entries.len() > self.capacity {
            entries.pop_back();
        }
    }

    /// Snapshot of the entries, most recent first.
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::content::SourceKind;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(SourceKind::Text, &format!("request {}", n), "ok")
    }

    #[test]
    fn test_newest_first() {
        let ledger = HistoryLedger::new();
        ledger.append(entry(1));
        ledger.append(entry(2));

        let listed = ledger.list();
        assert_eq!(listed[0].request_summary(), "request 2");
        assert_eq!(listed[1].request_summary(), "request 1");
    }

    #[test]
    fn test_eleventh_append_evicts_oldest() {
        let ledger = HistoryLedger::new();
        for n in 1..=11 {
            ledger.append(entry(n));
        }

        let listed = ledger.list();
        assert_eq!(listed.len(), DEFAULT_CAPACITY);
        assert_eq!(listed[0].request_summary(), "request 11");
        assert_eq!(listed[9].request_summary(), "request 2");
    }

    #[test]
    fn test_clear_empties() {
        let ledger = HistoryLedger::new();
        ledger.append(entry(1));
        ledger.clear();
        assert!(ledger.list().is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let ledger = HistoryLedger::with_capacity(0);
        ledger.append(entry(1));
        ledger.append(entry(2));
        assert_eq!(ledger.capacity(), 1);
        assert_eq!(ledger.list()[0].request_summary(), "request 2");
    }

    #[test]
    fn test_concurrent_appends_never_exceed_capacity() {
        let ledger = Arc::new(HistoryLedger::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        ledger.append(entry(t * 100 + n));
                        assert!(ledger.list().len() <= DEFAULT_CAPACITY);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ledger.len(), DEFAULT_CAPACITY);
    }

    proptest! {
        #[test]
        fn prop_keeps_most_recent_in_order(count in 0usize..40, capacity in 1usize..15) {
            let ledger = HistoryLedger::with_capacity(capacity);
            for n in 0..count {
                ledger.append(entry(n));
            }

            let listed: Vec<String> = ledger
                .list()
                .iter()
                .map(|e| e.request_summary().to_string())
                .collect();
            let expected: Vec<String> = (0..count)
                .rev()
                .take(capacity)
                .map(|n| format!("request {}", n))
                .collect();

            prop_assert_eq!(listed, expected);
        }
    }
}
