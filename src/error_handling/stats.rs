//! Per-kind error counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorKind;

/// Thread-safe error counter keyed by `ErrorKind`.
///
/// All kinds are initialized to zero on creation, so lookups never miss.
/// Used by the bulk importer to report what went wrong with failed batches.
#[derive(Debug)]
pub struct ErrorStats {
    errors: HashMap<ErrorKind, AtomicUsize>,
}

impl Default for ErrorStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for kind in ErrorKind::iter() {
            errors.insert(kind, AtomicUsize::new(0));
        }
        ErrorStats { errors }
    }

    /// Adds `count` to the counter for `kind`.
    pub fn add(&self, kind: ErrorKind, count: usize) {
        if let Some(counter) = self.errors.get(&kind) {
            counter.fetch_add(count, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in ErrorStats initialization.",
                kind
            );
        }
    }

    pub fn increment(&self, kind: ErrorKind) {
        self.add(kind, 1);
    }

    pub fn get(&self, kind: ErrorKind) -> usize {
        self.errors
            .get(&kind)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Non-zero counters in `ErrorKind` declaration order.
    pub fn snapshot(&self) -> Vec<(ErrorKind, usize)> {
        ErrorKind::iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_stats_initialization() {
        let stats = ErrorStats::new();
        for kind in ErrorKind::iter() {
            assert_eq!(stats.get(kind), 0);
        }
        assert_eq!(stats.total(), 0);
        assert!(stats.snapshot().is_empty());
    }

    #[test]
    fn test_error_stats_add_and_total() {
        let stats = ErrorStats::new();
        stats.add(ErrorKind::Server, 100);
        stats.increment(ErrorKind::Timeout);
        stats.increment(ErrorKind::Timeout);

        assert_eq!(stats.get(ErrorKind::Server), 100);
        assert_eq!(stats.get(ErrorKind::Timeout), 2);
        assert_eq!(stats.total(), 102);
        assert_eq!(
            stats.snapshot(),
            vec![(ErrorKind::Server, 100), (ErrorKind::Timeout, 2)]
        );
    }
}
