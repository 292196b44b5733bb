//! Per-key read counters for the auto-update policy.

use crate::strategy::ReadDecision;
use dashmap::DashMap;
use lattice_core::ReferenceKey;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts reads per key and decides when a key is due for a fresh fetch.
///
/// The check and the update happen under the key's shard lock, so when a
/// counter reaches the threshold exactly one concurrent reader is told to
/// refresh and all others are served from cache.
#[derive(Debug)]
pub struct AccessCounters {
    counts: DashMap<ReferenceKey, u32>,
    threshold: NonZeroU32,
    refreshes: AtomicU64,
}

impl AccessCounters {
    pub fn new(threshold: NonZeroU32) -> Self {
        Self {
            counts: DashMap::new(),
            threshold,
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn threshold(&self) -> NonZeroU32 {
        self.threshold
    }

    /// Record one read of `key`.
    ///
    /// The first `threshold` reads are served. The read after that resets the
    /// counter to 0 and returns [`ReadDecision::Refresh`].
    pub fn record(&self, key: &ReferenceKey) -> ReadDecision {
        let mut count = self.counts.entry(key.clone()).or_insert(0);
        if *count >= self.threshold.get() {
            *count = 0;
            self.refreshes.fetch_add(1, Ordering::Relaxed);
            ReadDecision::Refresh
        } else {
            *count += 1;
            ReadDecision::Serve
        }
    }

    /// Current count for `key`; 0 for keys never read.
    pub fn count(&self, key: &ReferenceKey) -> u32 {
        self.counts.get(key).map(|c| *c).unwrap_or(0)
    }

    /// Forget the count of `key`.
    pub fn reset(&self, key: &ReferenceKey) {
        self.counts.remove(key);
    }

    /// Total refresh decisions handed out.
    pub fn refreshes(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(n: u32) -> AccessCounters {
        AccessCounters::new(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn test_refresh_after_threshold_then_reset() {
        let counters = counters(3);
        let key = ReferenceKey::new("page/123/structureGroup");

        for expected in 1..=3 {
            assert_eq!(counters.record(&key), ReadDecision::Serve);
            assert_eq!(counters.count(&key), expected);
        }
        assert_eq!(counters.record(&key), ReadDecision::Refresh);
        assert_eq!(counters.count(&key), 0);
        assert_eq!(counters.refreshes(), 1);

        assert_eq!(counters.record(&key), ReadDecision::Serve);
        assert_eq!(counters.count(&key), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let counters = counters(1);
        let a = ReferenceKey::new("a");
        let b = ReferenceKey::new("b");
        assert_eq!(counters.record(&a), ReadDecision::Serve);
        assert_eq!(counters.record(&b), ReadDecision::Serve);
        assert_eq!(counters.record(&a), ReadDecision::Refresh);
        assert_eq!(counters.count(&b), 1);
    }

    #[test]
    fn test_reset_forgets_key() {
        let counters = counters(2);
        let key = ReferenceKey::new("k");
        counters.record(&key);
        counters.reset(&key);
        assert_eq!(counters.count(&key), 0);
    }
}
