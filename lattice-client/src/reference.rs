//! Single reference: one lazily resolved relationship.

use crate::blocking::BlockingError;
use crate::context::ClientContext;
use lattice_core::{BoxError, ClientResult, ReferenceKey, TransformError};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Projection function from a decoded raw value to a client value.
pub type ProjectFn<R, P> = Arc<dyn Fn(&ClientContext, R) -> Result<P, BoxError> + Send + Sync>;

/// An unresolved pointer to one related entity.
///
/// Built once with its owning entity and bound to a fixed URI. Each
/// resolution either returns a cached value or performs exactly one
/// fetch-then-project sequence. Nothing is held on the reference itself.
pub struct Reference<R, P> {
    ctx: ClientContext,
    key: Option<ReferenceKey>,
    target: &'static str,
    project: ProjectFn<R, P>,
    _raw: PhantomData<fn() -> R>,
}

impl<R, P> Reference<R, P>
where
    R: DeserializeOwned + Send + 'static,
    P: Clone + Send + Sync + 'static,
{
    /// `key` is `None` when the owning entity has no such relationship.
    pub fn new<F>(ctx: ClientContext, key: Option<ReferenceKey>, target: &'static str, project: F) -> Self
    where
        F: Fn(&ClientContext, R) -> Result<P, BoxError> + Send + Sync + 'static,
    {
        Self {
            ctx,
            key,
            target,
            project: Arc::new(project),
            _raw: PhantomData,
        }
    }

    /// URI of the target, if the relationship exists.
    pub fn key(&self) -> Option<&ReferenceKey> {
        self.key.as_ref()
    }

    /// Resolve asynchronously. `Ok(None)` when the relationship is absent or
    /// the target does not exist.
    pub async fn resolve(&self) -> ClientResult<Option<P>> {
        let Some(key) = &self.key else {
            return Ok(None);
        };
        self.ctx
            .through_cache(key, self.fetch_and_project(key))
            .await
    }

    /// Resolve on the calling thread, waiting at most `deadline`
    /// (default: the configured timeout).
    pub fn resolve_blocking(&self, deadline: Option<Duration>) -> Result<Option<P>, BlockingError> {
        let this = self.clone();
        self.ctx
            .blocking()
            .wait(async move { this.resolve().await }, deadline)
    }

    async fn fetch_and_project(&self, key: &ReferenceKey) -> ClientResult<Option<P>> {
        debug!(uri = %key, kind = self.target, "Fetching reference");
        let Some(raw) = self.ctx.fetcher().fetch_one(key).await? else {
            debug!(uri = %key, kind = self.target, "Reference target not found");
            return Ok(None);
        };
        let decoded: R = raw.decode()?;
        match (self.project)(&self.ctx, decoded) {
            Ok(projected) => Ok(Some(projected)),
            Err(cause) => {
                warn!(uri = %key, kind = self.target, error = %cause, "Projection failed");
                Err(TransformError::new(self.target, None, cause).into())
            }
        }
    }
}

impl<R, P> Clone for Reference<R, P> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            key: self.key.clone(),
            target: self.target,
            project: Arc::clone(&self.project),
            _raw: PhantomData,
        }
    }
}

impl<R, P> fmt::Debug for Reference<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("target", &self.target)
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchAdapter;
    use crate::runtime::ExecutionContext;
    use async_trait::async_trait;
    use lattice_cache::{CacheStrategy, InMemoryCacheStore};
    use lattice_core::{ClientConfig, ClientError, RawEntity, TransportError};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::runtime::Handle;

    #[derive(Debug, Deserialize)]
    struct RawTitle {
        #[serde(rename = "Title")]
        title: String,
    }

    /// Answers every URI with the same title and counts calls.
    struct TitleFetcher {
        title: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FetchAdapter for TitleFetcher {
        async fn fetch_one(&self, uri: &ReferenceKey) -> Result<Option<RawEntity>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .title
                .map(|t| RawEntity::new(uri.clone(), json!({ "Title": t }))))
        }

        async fn fetch_many(&self, _uri: &ReferenceKey) -> Result<Vec<RawEntity>, TransportError> {
            Ok(Vec::new())
        }
    }

    fn context(fetcher: Arc<TitleFetcher>, cache: CacheStrategy) -> (ExecutionContext, ClientContext) {
        let execution = ExecutionContext::from_handle(Handle::current());
        let ctx = ClientContext::new(
            ClientConfig::default(),
            fetcher,
            cache,
            execution.handle().clone(),
        );
        (execution, ctx)
    }

    fn title_ref(ctx: &ClientContext, key: Option<&str>) -> Reference<RawTitle, String> {
        Reference::new(ctx.clone(), key.map(ReferenceKey::new), "Title", |_, raw: RawTitle| {
            if raw.title.is_empty() {
                Err("empty title".into())
            } else {
                Ok(raw.title.to_uppercase())
            }
        })
    }

    #[tokio::test]
    async fn test_absent_link_resolves_to_none_without_fetch() {
        let fetcher = Arc::new(TitleFetcher { title: Some("x"), calls: AtomicUsize::new(0) });
        let (_execution, ctx) = context(fetcher.clone(), CacheStrategy::none());
        assert_eq!(title_ref(&ctx, None).resolve().await.unwrap(), None);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_projection_applied() {
        let fetcher = Arc::new(TitleFetcher { title: Some("home"), calls: AtomicUsize::new(0) });
        let (_execution, ctx) = context(fetcher, CacheStrategy::none());
        let value = title_ref(&ctx, Some("http://cd/Pages(1)")).resolve().await.unwrap();
        assert_eq!(value.as_deref(), Some("HOME"));
    }

    #[tokio::test]
    async fn test_projection_failure_is_transform_error() {
        let fetcher = Arc::new(TitleFetcher { title: Some(""), calls: AtomicUsize::new(0) });
        let (_execution, ctx) = context(fetcher, CacheStrategy::none());
        let err = title_ref(&ctx, Some("http://cd/Pages(1)")).resolve().await.unwrap_err();
        match err {
            ClientError::Transform(t) => {
                assert_eq!(t.target, "Title");
                assert_eq!(t.index, None);
                assert_eq!(t.source.to_string(), "empty title");
            }
            other => panic!("expected Transform, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let fetcher = Arc::new(TitleFetcher { title: None, calls: AtomicUsize::new(0) });
        let store = Arc::new(InMemoryCacheStore::new());
        let (_execution, ctx) = context(fetcher.clone(), CacheStrategy::simple(store.clone()));
        let reference = title_ref(&ctx, Some("http://cd/Pages(404)"));
        assert_eq!(reference.resolve().await.unwrap(), None);
        assert_eq!(reference.resolve().await.unwrap(), None);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clone_shares_key() {
        let fetcher = Arc::new(TitleFetcher { title: None, calls: AtomicUsize::new(0) });
        let (_execution, ctx) = context(fetcher, CacheStrategy::none());
        let reference = title_ref(&ctx, Some("http://cd/Pages(1)"));
        assert_eq!(reference.clone().key(), reference.key());
        assert!(format!("{:?}", reference).contains("Pages(1)"));
    }
}
