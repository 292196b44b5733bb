//! Client context shared by every reference in one entity graph.

use crate::blocking::BlockingAdapter;
use crate::collection::ReferenceList;
use crate::fetch::FetchAdapter;
use crate::projection::Projectable;
use crate::reference::Reference;
use crate::runtime::ExecutionHandle;
use lattice_cache::{CacheStrategy, ReadDecision};
use lattice_core::{ClientConfig, ClientResult, RawLink, ReferenceKey, ResourcePath};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Configuration, cache strategy, fetch adapter and execution handle of a
/// client. Cheap to clone; fixed for its lifetime.
#[derive(Clone)]
pub struct ClientContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: ClientConfig,
    paths: ResourcePath,
    cache: CacheStrategy,
    fetcher: Arc<dyn FetchAdapter>,
    blocking: BlockingAdapter,
}

impl ClientContext {
    pub fn new(
        config: ClientConfig,
        fetcher: Arc<dyn FetchAdapter>,
        cache: CacheStrategy,
        execution: ExecutionHandle,
    ) -> Self {
        let paths = ResourcePath::new(&config.webservice_location);
        let blocking = BlockingAdapter::new(execution, config.default_timeout());
        Self {
            inner: Arc::new(ContextInner {
                config,
                paths,
                cache,
                fetcher,
                blocking,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn paths(&self) -> &ResourcePath {
        &self.inner.paths
    }

    pub fn cache(&self) -> &CacheStrategy {
        &self.inner.cache
    }

    pub fn fetcher(&self) -> &Arc<dyn FetchAdapter> {
        &self.inner.fetcher
    }

    pub fn blocking(&self) -> &BlockingAdapter {
        &self.inner.blocking
    }

    /// Single reference following `link`; an absent link resolves to `None`.
    pub fn single<P: Projectable>(&self, link: Option<&RawLink>) -> Reference<P::Raw, P> {
        Reference::new(
            self.clone(),
            link.map(RawLink::key),
            P::KIND.as_str(),
            P::project,
        )
    }

    /// Collection reference following `link`; an absent link resolves to an empty list.
    pub fn list<P: Projectable>(&self, link: Option<&RawLink>) -> ReferenceList<P::Raw, P> {
        ReferenceList::new(
            self.clone(),
            link.map(RawLink::key),
            P::KIND.as_str(),
            P::project,
        )
    }

    /// Single reference to the resource at `key`.
    pub fn single_at<P: Projectable>(&self, key: ReferenceKey) -> Reference<P::Raw, P> {
        Reference::new(self.clone(), Some(key), P::KIND.as_str(), P::project)
    }

    /// Collection reference to the resources at `key`.
    pub fn list_at<P: Projectable>(&self, key: ReferenceKey) -> ReferenceList<P::Raw, P> {
        ReferenceList::new(self.clone(), Some(key), P::KIND.as_str(), P::project)
    }

    /// Serve `key` through the cache strategy, calling `load` at most once.
    ///
    /// Present results are stored under `key` unless caching is disabled;
    /// absent results are never stored.
    pub(crate) async fn through_cache<T, F>(&self, key: &ReferenceKey, load: F) -> ClientResult<Option<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: Future<Output = ClientResult<Option<T>>>,
    {
        let decision = self.cache().read_decision(key);
        let store = match (decision, self.cache().store()) {
            (ReadDecision::Bypass, _) | (_, None) => None,
            (ReadDecision::Serve, Some(store)) => {
                if let Some(hit) = store.get_as::<T>(key)? {
                    debug!(uri = %key, "Cache hit");
                    return Ok(Some(hit));
                }
                debug!(uri = %key, "Cache miss");
                Some(store)
            }
            (ReadDecision::Refresh, Some(store)) => {
                // The stale entry keeps serving concurrent readers until the
                // refreshed value replaces it.
                debug!(uri = %key, "Refreshing cached value");
                Some(store)
            }
        };

        let loaded = match load.await {
            Ok(loaded) => loaded,
            Err(e) => {
                if let (ReadDecision::Refresh, Some(store)) = (decision, store) {
                    store.remove(key)?;
                }
                return Err(e);
            }
        };
        match (store, &loaded) {
            (Some(store), Some(value)) => store.put_as(key.clone(), value.clone())?,
            (Some(store), None) if decision == ReadDecision::Refresh => store.remove(key)?,
            _ => {}
        }
        Ok(loaded)
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("webservice_location", &self.inner.paths.location())
            .field("cache", &self.inner.cache)
            .finish()
    }
}
