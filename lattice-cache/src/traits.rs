//! Storage contract behind the memoizing cache strategies.
//!
//! Stores are keyed by [`ReferenceKey`] and hold type-erased values. They know
//! nothing about entities or the network; typing is recovered on read through
//! `get_as`.

use lattice_core::{CacheError, ReferenceKey};
use std::any::{type_name, Any};
use std::sync::Arc;

/// A value held by a cache store.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value storage used by the memoizing strategies.
///
/// # Implementation Requirements
///
/// - Stores are shared by every reference of a client context and reached
///   from any runtime worker, so they must be safe to call concurrently
///   without external locking.
/// - `get` and `put` must not block on I/O; they run inline in resolution.
pub trait CacheStore: Send + Sync {
    /// Look up the value stored under `key`.
    fn get(&self, key: &ReferenceKey) -> CacheResult<Option<CachedValue>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: ReferenceKey, value: CachedValue) -> CacheResult<()>;

    /// Drop the value stored under `key`, if any.
    fn remove(&self, _key: &ReferenceKey) -> CacheResult<()> {
        Ok(())
    }

    /// Usage statistics. Stores that do not track usage report zeros.
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

impl dyn CacheStore {
    /// Typed lookup. A value of another type under `key` is an error, not a miss.
    pub fn get_as<T>(&self, key: &ReferenceKey) -> CacheResult<Option<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => value
                .downcast::<T>()
                .map(|typed| Some(T::clone(&typed)))
                .map_err(|_| CacheError::TypeMismatch {
                    key: key.clone(),
                    expected: type_name::<T>(),
                }),
        }
    }

    /// Typed store.
    pub fn put_as<T>(&self, key: ReferenceKey, value: T) -> CacheResult<()>
    where
        T: Send + Sync + 'static,
    {
        self.put(key, Arc::new(value))
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups that found a value.
    pub hits: u64,
    /// Number of lookups that found nothing.
    pub misses: u64,
    /// Number of entries currently stored.
    pub entry_count: u64,
    /// Number of reads the auto-update policy turned into a fresh fetch.
    pub refreshes: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<ReferenceKey, CachedValue>>);

    impl CacheStore for MapStore {
        fn get(&self, key: &ReferenceKey) -> CacheResult<Option<CachedValue>> {
            let map = self.0.lock().map_err(|_| CacheError::LockPoisoned)?;
            Ok(map.get(key).cloned())
        }

        fn put(&self, key: ReferenceKey, value: CachedValue) -> CacheResult<()> {
            let mut map = self.0.lock().map_err(|_| CacheError::LockPoisoned)?;
            map.insert(key, value);
            Ok(())
        }
    }

    #[test]
    fn test_typed_round_trip() {
        let store: Arc<dyn CacheStore> = Arc::new(MapStore::default());
        let key = ReferenceKey::new("page/123/structureGroup");
        store.put_as(key.clone(), String::from("Root")).unwrap();
        assert_eq!(store.get_as::<String>(&key).unwrap().as_deref(), Some("Root"));
    }

    #[test]
    fn test_wrong_type_is_mismatch() {
        let store: Arc<dyn CacheStore> = Arc::new(MapStore::default());
        let key = ReferenceKey::new("k");
        store.put_as(key.clone(), 42u32).unwrap();
        match store.get_as::<String>(&key) {
            Err(CacheError::TypeMismatch { key: k, .. }) => assert_eq!(k, key),
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_default_stats_and_hit_rate() {
        let store = MapStore::default();
        assert_eq!(store.stats(), CacheStats::default());
        assert_eq!(store.stats().hit_rate(), 0.0);

        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
