//! Collection reference: a lazily resolved, ordered list of related entities.

use crate::blocking::BlockingError;
use crate::context::ClientContext;
use crate::reference::ProjectFn;
use lattice_core::{BoxError, ClientResult, ReferenceKey, TransformError};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// An unresolved pointer to an ordered collection of related entities.
///
/// Elements are projected one by one in source order. The first element that
/// fails to decode or project fails the whole resolution.
pub struct ReferenceList<R, P> {
    ctx: ClientContext,
    key: Option<ReferenceKey>,
    target: &'static str,
    project: ProjectFn<R, P>,
    _raw: PhantomData<fn() -> R>,
}

impl<R, P> ReferenceList<R, P>
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

    pub fn key(&self) -> Option<&ReferenceKey> {
        self.key.as_ref()
    }

    /// Resolve asynchronously. Absent relationships and empty sources give an
    /// empty vector.
    pub async fn resolve(&self) -> ClientResult<Vec<P>> {
        let Some(key) = &self.key else {
            return Ok(Vec::new());
        };
        let load = async { self.fetch_and_project(key).await.map(Some) };
        let resolved = self.ctx.through_cache(key, load).await?;
        Ok(resolved.unwrap_or_default())
    }

    /// Resolve on the calling thread, waiting at most `deadline`
    /// (default: the configured timeout).
    pub fn resolve_blocking(&self, deadline: Option<Duration>) -> Result<Vec<P>, BlockingError> {
        let this = self.clone();
        self.ctx
            .blocking()
            .wait(async move { this.resolve().await }, deadline)
    }

    async fn fetch_and_project(&self, key: &ReferenceKey) -> ClientResult<Vec<P>> {
        debug!(uri = %key, kind = self.target, "Fetching collection");
        let raws = self.ctx.fetcher().fetch_many(key).await?;
        let elements = raws.len();

        let mut projected = Vec::with_capacity(elements);
        for (index, raw) in raws.into_iter().enumerate() {
            let decoded: R = raw.decode()?;
            match (self.project)(&self.ctx, decoded) {
                Ok(value) => projected.push(value),
                Err(cause) => {
                    warn!(uri = %key, kind = self.target, index, error = %cause, "Projection failed");
                    return Err(TransformError::new(self.target, Some(index), cause).into());
                }
            }
        }
        debug!(uri = %key, kind = self.target, elements, "Collection resolved");
        Ok(projected)
    }
}

impl<R, P> Clone for ReferenceList<R, P> {
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

impl<R, P> fmt::Debug for ReferenceList<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceList")
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
    use lattice_cache::CacheStrategy;
    use lattice_core::{ClientConfig, ClientError, RawEntity, TransportError};
    use serde_json::json;
    use tokio::runtime::Handle;

    struct Numbers(Vec<i64>);

    #[async_trait]
    impl FetchAdapter for Numbers {
        async fn fetch_one(&self, _uri: &ReferenceKey) -> Result<Option<RawEntity>, TransportError> {
            Ok(None)
        }

        async fn fetch_many(&self, uri: &ReferenceKey) -> Result<Vec<RawEntity>, TransportError> {
            Ok(self
                .0
                .iter()
                .map(|n| RawEntity::new(uri.clone(), json!(n)))
                .collect())
        }
    }

    fn halves(ctx: &ClientContext, key: Option<&str>) -> ReferenceList<i64, i64> {
        ReferenceList::new(ctx.clone(), key.map(ReferenceKey::new), "Half", |_, n: i64| {
            if n % 2 == 0 {
                Ok(n / 2)
            } else {
                Err(format!("{n} is odd").into())
            }
        })
    }

    fn context(numbers: Vec<i64>) -> (ExecutionContext, ClientContext) {
        let execution = ExecutionContext::from_handle(Handle::current());
        let ctx = ClientContext::new(
            ClientConfig::default(),
            Arc::new(Numbers(numbers)),
            CacheStrategy::none(),
            execution.handle().clone(),
        );
        (execution, ctx)
    }

    #[tokio::test]
    async fn test_preserves_source_order() {
        let (_execution, ctx) = context(vec![8, 2, 4, 2]);
        let values = halves(&ctx, Some("http://cd/n")).resolve().await.unwrap();
        assert_eq!(values, vec![4, 1, 2, 1]);
    }

    #[tokio::test]
    async fn test_fails_fast_with_element_index() {
        let (_execution, ctx) = context(vec![2, 3, 4]);
        let err = halves(&ctx, Some("http://cd/n")).resolve().await.unwrap_err();
        match err {
            ClientError::Transform(t) => assert_eq!(t.index, Some(1)),
            other => panic!("expected Transform, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_and_absent_resolve_to_empty() {
        let (_execution, ctx) = context(Vec::new());
        assert!(halves(&ctx, Some("http://cd/n")).resolve().await.unwrap().is_empty());
        assert!(halves(&ctx, None).resolve().await.unwrap().is_empty());
    }
}
