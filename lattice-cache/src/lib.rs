//! LATTICE Cache - Cache Strategies for Resolved References
//!
//! Pure storage: no knowledge of entities or the network. A client context
//! picks one [`CacheStrategy`] and every reference in it goes through that
//! strategy.
//!
//! # Example
//!
//! ```ignore
//! let strategy = CacheStrategy::in_memory(&CacheConfig {
//!     mode: CacheMode::AutoUpdate,
//!     refresh_after: 100,
//! })?;
//! match strategy.read_decision(&key) {
//!     ReadDecision::Bypass => { /* fetch, do not store */ }
//!     ReadDecision::Serve => { /* stored value or fetch-and-store */ }
//!     ReadDecision::Refresh => { /* drop, fetch, store */ }
//! }
//! ```

pub mod counter;
pub mod memory;
pub mod strategy;
pub mod traits;

pub use counter::AccessCounters;
pub use memory::InMemoryCacheStore;
pub use strategy::{AutoUpdateCache, CacheStrategy, NoCache, ReadDecision, SimpleCache};
pub use traits::{CacheResult, CacheStats, CacheStore, CachedValue};
