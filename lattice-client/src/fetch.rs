//! Fetch adapter contract.
//!
//! The only way the client reaches the content delivery service. Adapters
//! report "not found" as `Ok(None)` (or an empty collection), never as an error.

use async_trait::async_trait;
use lattice_core::{RawEntity, ReferenceKey, TransportError};

/// Retrieves raw entities by URI.
///
/// Implementations must be safe to share between runtime workers. A call
/// suspends only for the network round trip.
#[async_trait]
pub trait FetchAdapter: Send + Sync {
    /// Fetch the single entity at `uri`.
    async fn fetch_one(&self, uri: &ReferenceKey) -> Result<Option<RawEntity>, TransportError>;

    /// Fetch the collection at `uri`, in the order the service returns it.
    async fn fetch_many(&self, uri: &ReferenceKey) -> Result<Vec<RawEntity>, TransportError>;
}
