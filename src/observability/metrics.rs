//! Query counters
//!
//! Counters only, monotonic, reset on process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters kept by the query service
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    queries_executed: AtomicU64,
    queries_rejected: AtomicU64,
    rows_returned: AtomicU64,
    datasets_added: AtomicU64,
    datasets_removed: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a successful query and its row count
    pub fn record_query(&self, rows: usize) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
        self.rows_returned.fetch_add(rows as u64, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_datasets_added(&self) {
        self.datasets_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_datasets_removed(&self) {
        self.datasets_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            datasets_added: self.datasets_added.load(Ordering::Relaxed),
            datasets_removed: self.datasets_removed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub rows_returned: u64,
    pub datasets_added: u64,
    pub datasets_removed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.queries_executed, 0);
        assert_eq!(snapshot.rows_returned, 0);
    }

    #[test]
    fn test_record_query() {
        let registry = MetricsRegistry::new();
        registry.record_query(10);
        registry.record_query(5);
        registry.increment_queries_rejected();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.queries_executed, 2);
        assert_eq!(snapshot.rows_returned, 15);
        assert_eq!(snapshot.queries_rejected, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_datasets_added();

        let parsed = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(parsed["datasets_added"], 1);
        assert_eq!(parsed["datasets_removed"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.record_query(1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().queries_executed, 1000);
        assert_eq!(registry.snapshot().rows_returned, 1000);
    }
}
