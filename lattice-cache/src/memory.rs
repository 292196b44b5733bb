//! In-process cache store.

use crate::traits::{CacheResult, CacheStats, CacheStore, CachedValue};
use dashmap::DashMap;
use lattice_core::ReferenceKey;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unbounded concurrent store. Entries live until removed or the store is dropped.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: DashMap<ReferenceKey, CachedValue>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &ReferenceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for InMemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCacheStore")
            .field("entries", &self.entries.len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &ReferenceKey) -> CacheResult<Option<CachedValue>> {
        let found = self.entries.get(key).map(|entry| entry.value().clone());
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(found)
    }

    fn put(&self, key: ReferenceKey, value: CachedValue) -> CacheResult<()> {
        self.entries.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &ReferenceKey) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
            refreshes: 0,
        }
    }
}
