//! The three cache strategies a client context can run with.
//!
//! A strategy is chosen once per context and shared by every reference in it.
//! Resolution asks [`CacheStrategy::read_decision`] what to do with a key and
//! talks to [`CacheStrategy::store`] directly; it never calls into
//! [`NoCache`], whose operations exist only to fail.

use crate::counter::AccessCounters;
use crate::memory::InMemoryCacheStore;
use crate::traits::{CacheResult, CacheStats, CacheStore, CachedValue};
use lattice_core::{CacheConfig, CacheError, CacheMode, ConfigError, ReferenceKey};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// What a resolution should do for one read of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadDecision {
    /// Caching is disabled: fetch, and do not store.
    Bypass,
    /// Use the stored value if there is one; fetch and store on a miss.
    Serve,
    /// Discard the stored value, fetch and store again.
    Refresh,
}

/// Strategy that stores nothing. Every storage operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CacheStore for NoCache {
    fn get(&self, _key: &ReferenceKey) -> CacheResult<Option<CachedValue>> {
        Err(CacheError::Unsupported { operation: "get" })
    }

    fn put(&self, _key: ReferenceKey, _value: CachedValue) -> CacheResult<()> {
        Err(CacheError::Unsupported { operation: "put" })
    }

    fn remove(&self, _key: &ReferenceKey) -> CacheResult<()> {
        Err(CacheError::Unsupported { operation: "remove" })
    }
}

/// Passive memoization: the first resolution of a key populates the store and
/// later resolutions are served from it until the process ends.
#[derive(Clone)]
pub struct SimpleCache {
    store: Arc<dyn CacheStore>,
}

impl SimpleCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }
}

/// Memoization with bounded staleness measured in reads: after
/// `refresh_after` reads of a key the next read fetches it again.
#[derive(Clone)]
pub struct AutoUpdateCache {
    store: Arc<dyn CacheStore>,
    counters: Arc<AccessCounters>,
}

impl AutoUpdateCache {
    pub fn new(store: Arc<dyn CacheStore>, refresh_after: NonZeroU32) -> Self {
        Self {
            store,
            counters: Arc::new(AccessCounters::new(refresh_after)),
        }
    }

    pub fn counters(&self) -> &AccessCounters {
        &self.counters
    }
}

/// Cache strategy of a client context.
#[derive(Clone)]
pub enum CacheStrategy {
    None(NoCache),
    Simple(SimpleCache),
    AutoUpdate(AutoUpdateCache),
}

impl Default for CacheStrategy {
    fn default() -> Self {
        CacheStrategy::None(NoCache)
    }
}

impl std::fmt::Debug for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheStrategy::None(_) => f.write_str("CacheStrategy::None"),
            CacheStrategy::Simple(_) => f.write_str("CacheStrategy::Simple"),
            CacheStrategy::AutoUpdate(auto) => f
                .debug_struct("CacheStrategy::AutoUpdate")
                .field("refresh_after", &auto.counters.threshold())
                .finish(),
        }
    }
}

impl CacheStrategy {
    pub fn none() -> Self {
        CacheStrategy::None(NoCache)
    }

    pub fn simple(store: Arc<dyn CacheStore>) -> Self {
        CacheStrategy::Simple(SimpleCache::new(store))
    }

    pub fn auto_update(store: Arc<dyn CacheStore>, refresh_after: NonZeroU32) -> Self {
        CacheStrategy::AutoUpdate(AutoUpdateCache::new(store, refresh_after))
    }

    /// Build the strategy `config` selects, backed by an [`InMemoryCacheStore`].
    pub fn in_memory(config: &CacheConfig) -> Result<Self, ConfigError> {
        Self::with_store(config, Arc::new(InMemoryCacheStore::new()))
    }

    /// Build the strategy `config` selects over a caller-supplied store.
    /// The store is ignored when caching is disabled.
    pub fn with_store(config: &CacheConfig, store: Arc<dyn CacheStore>) -> Result<Self, ConfigError> {
        match config.mode {
            CacheMode::None => Ok(Self::none()),
            CacheMode::Simple => Ok(Self::simple(store)),
            CacheMode::AutoUpdate => {
                let refresh_after = NonZeroU32::new(config.refresh_after).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        field: "cache.refresh_after".to_string(),
                        value: config.refresh_after.to_string(),
                        reason: "refresh_after must be greater than 0".to_string(),
                    }
                })?;
                Ok(Self::auto_update(store, refresh_after))
            }
        }
    }

    pub fn mode(&self) -> CacheMode {
        match self {
            CacheStrategy::None(_) => CacheMode::None,
            CacheStrategy::Simple(_) => CacheMode::Simple,
            CacheStrategy::AutoUpdate(_) => CacheMode::AutoUpdate,
        }
    }

    /// Backing store of a memoizing strategy; `None` when caching is disabled.
    pub fn store(&self) -> Option<&Arc<dyn CacheStore>> {
        match self {
            CacheStrategy::None(_) => None,
            CacheStrategy::Simple(simple) => Some(&simple.store),
            CacheStrategy::AutoUpdate(auto) => Some(&auto.store),
        }
    }

    /// Decide how to serve one read of `key`. Counts the read under auto-update.
    pub fn read_decision(&self, key: &ReferenceKey) -> ReadDecision {
        match self {
            CacheStrategy::None(_) => ReadDecision::Bypass,
            CacheStrategy::Simple(_) => ReadDecision::Serve,
            CacheStrategy::AutoUpdate(auto) => {
                let decision = auto.counters.record(key);
                if decision == ReadDecision::Refresh {
                    debug!(uri = %key, refresh_after = auto.counters.threshold().get(), "Auto-update threshold reached");
                }
                decision
            }
        }
    }

    /// Store statistics plus refreshes handed out by the auto-update policy.
    pub fn stats(&self) -> CacheStats {
        match self {
            CacheStrategy::None(_) => CacheStats::default(),
            CacheStrategy::Simple(simple) => simple.store.stats(),
            CacheStrategy::AutoUpdate(auto) => CacheStats {
                refreshes: auto.counters.refreshes(),
                ..auto.store.stats()
            },
        }
    }

    /// Read counter of `key` under auto-update; `None` for other strategies.
    pub fn access_count(&self, key: &ReferenceKey) -> Option<u32> {
        match self {
            CacheStrategy::AutoUpdate(auto) => Some(auto.counters.count(key)),
            _ => None,
        }
    }
}

impl CacheStore for CacheStrategy {
    fn get(&self, key: &ReferenceKey) -> CacheResult<Option<CachedValue>> {
        match self.store() {
            Some(store) => store.get(key),
            None => NoCache.get(key),
        }
    }

    fn put(&self, key: ReferenceKey, value: CachedValue) -> CacheResult<()> {
        match self.store() {
            Some(store) => store.put(key, value),
            None => NoCache.put(key, value),
        }
    }

    fn remove(&self, key: &ReferenceKey) -> CacheResult<()> {
        match self.store() {
            Some(store) => store.remove(key),
            None => NoCache.remove(key),
        }
    }

    fn stats(&self) -> CacheStats {
        CacheStrategy::stats(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cache_operations_fail() {
        let key = ReferenceKey::new("k");
        assert_eq!(
            NoCache.get(&key).unwrap_err(),
            CacheError::Unsupported { operation: "get" }
        );
        assert_eq!(
            NoCache.put(key.clone(), Arc::new(1u8)).unwrap_err(),
            CacheError::Unsupported { operation: "put" }
        );

        let strategy = CacheStrategy::none();
        assert!(strategy.store().is_none());
        assert_eq!(strategy.read_decision(&key), ReadDecision::Bypass);
        assert!(CacheStore::get(&strategy, &key).is_err());
    }

    #[test]
    fn test_simple_always_serves() {
        let strategy = CacheStrategy::simple(Arc::new(InMemoryCacheStore::new()));
        let key = ReferenceKey::new("k");
        for _ in 0..1_000 {
            assert_eq!(strategy.read_decision(&key), ReadDecision::Serve);
        }
        assert_eq!(strategy.mode(), CacheMode::Simple);
        assert!(strategy.access_count(&key).is_none());
    }

    #[test]
    fn test_in_memory_from_config() {
        let none = CacheStrategy::in_memory(&CacheConfig::default()).unwrap();
        assert_eq!(none.mode(), CacheMode::None);

        let auto = CacheStrategy::in_memory(&CacheConfig {
            mode: CacheMode::AutoUpdate,
            refresh_after: 3,
        })
        .unwrap();
        assert_eq!(auto.mode(), CacheMode::AutoUpdate);
        assert!(auto.store().is_some());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = CacheStrategy::in_memory(&CacheConfig {
            mode: CacheMode::AutoUpdate,
            refresh_after: 0,
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_stats_include_refreshes() {
        let strategy =
            CacheStrategy::auto_update(Arc::new(InMemoryCacheStore::new()), NonZeroU32::MIN);
        let key = ReferenceKey::new("k");
        strategy.read_decision(&key);
        assert_eq!(strategy.read_decision(&key), ReadDecision::Refresh);
        assert_eq!(strategy.stats().refreshes, 1);
    }
}
