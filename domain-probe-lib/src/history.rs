//! Bounded, newest-first log of completed probes.

use crate::types::ProbeResult;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::RwLock;

const DEFAULT_PER_PAGE: usize = 20;
const MAX_PER_PAGE: usize = 100;

/// One page of history entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPage {
    pub items: Vec<ProbeResult>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// In-memory history of probe results, most recent first.
///
/// Appends may come from many probe tasks at once; the ledger never grows
/// past its capacity, the oldest entry is dropped instead.
#[derive(Debug)]
pub struct HistoryLedger {
    capacity: usize,
    entries: RwLock<VecDeque<ProbeResult>>,
}

impl HistoryLedger {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Prepend one result, evicting the oldest entry past capacity.
    pub fn record(&self, result: ProbeResult) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push_front(result);
        entries.truncate(self.capacity);
    }

    /// Prepend several results in order; the last one ends up newest.
    pub fn record_many<I: IntoIterator<Item = ProbeResult>>(&self, results: I) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for result in results {
            entries.push_front(result);
        }
        entries.truncate(self.capacity);
    }

    /// Fetch one page, newest first.
    ///
    /// `page` below 1 becomes 1 and `per_page` outside `1..=100` becomes 20.
    /// A page past the end yields no items but still reports the totals.
    pub fn list(&self, page: usize, per_page: usize) -> HistoryPage {
        let page = page.max(1);
        let per_page = if (1..=MAX_PER_PAGE).contains(&per_page) {
            per_page
        } else {
            DEFAULT_PER_PAGE
        };

        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let total = entries.len();
        let items = entries
            .iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect();

        HistoryPage {
            items,
            total,
            page,
            per_page,
            total_pages: total.div_ceil(per_page),
        }
    }

    pub fn clear(&self) {
        match self.entries.write() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
        tracing::info!("history cleared");
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Availability;
    use chrono::Utc;
    use std::sync::Arc;

    fn result(id: u64) -> ProbeResult {
        ProbeResult {
            id,
            name: format!("name{}.com", id),
            extension: ".com".to_string(),
            available: true,
            status: Availability::Available,
            ip: None,
            dns_resolved: false,
            checked_at: Utc::now(),
            response_time_ms: 1,
            error: Some("no such host".to_string()),
        }
    }

    #[test]
    fn test_newest_first() {
        let ledger = HistoryLedger::new(10);
        ledger.record(result(1));
        ledger.record(result(2));
        ledger.record(result(3));

        let ids: Vec<u64> = ledger.list(1, 20).items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let ledger = HistoryLedger::new(3);
        ledger.record_many((1..=5).map(result));

        assert_eq!(ledger.len(), 3);
        let ids: Vec<u64> = ledger.list(1, 20).items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn test_clear() {
        let ledger = HistoryLedger::default();
        ledger.record(result(1));
        ledger.clear();

        let page = ledger.list(1, 20);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_pagination() {
        let ledger = HistoryLedger::new(100);
        ledger.record_many((1..=45).map(result));

        let page = ledger.list(3, 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, 5);

        let past_end = ledger.list(9, 20);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 45);
    }

    #[test]
    fn test_pagination_clamps() {
        let ledger = HistoryLedger::new(100);
        ledger.record_many((1..=30).map(result));

        let page = ledger.list(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);
        assert_eq!(page.items.len(), 20);

        assert_eq!(ledger.list(1, 101).per_page, 20);
        assert_eq!(ledger.list(1, 100).per_page, 100);
    }

    #[test]
    fn test_concurrent_appends_respect_capacity() {
        let ledger = Arc::new(HistoryLedger::new(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        ledger.record(result(t * 1000 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ledger.len(), 50);
    }
}
