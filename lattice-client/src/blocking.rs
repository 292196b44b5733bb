//! Blocking adapter: synchronous waits on asynchronous resolutions.
//!
//! Every failure path of a blocking getter comes out as one [`BlockingError`],
//! whatever went wrong underneath.

use crate::runtime::ExecutionHandle;
use lattice_core::{ClientError, ClientResult, ErrorKind};
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::warn;

/// Uniform error returned by blocking getters.
#[derive(Debug, Clone, Error)]
#[error("Blocking resolution failed: {cause}")]
pub struct BlockingError {
    #[source]
    cause: ClientError,
}

impl BlockingError {
    /// The failure that ended the wait.
    pub fn cause(&self) -> &ClientError {
        &self.cause
    }

    pub fn into_cause(self) -> ClientError {
        self.cause
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, ClientError::Timeout { .. })
    }
}

impl From<ClientError> for BlockingError {
    fn from(cause: ClientError) -> Self {
        Self { cause }
    }
}

/// Waits for resolutions on the calling thread, bounded by a deadline.
#[derive(Debug, Clone)]
pub struct BlockingAdapter {
    execution: ExecutionHandle,
    default_timeout: Duration,
}

impl BlockingAdapter {
    pub fn new(execution: ExecutionHandle, default_timeout: Duration) -> Self {
        Self {
            execution,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `future` on the execution context and block until it completes or
    /// `deadline` (default: the configured timeout) elapses.
    ///
    /// Calling this from a thread that drives async tasks fails with
    /// [`ClientError::BlockingInAsyncContext`]; `spawn_blocking` threads and
    /// plain threads may wait. A timeout abandons only the
    /// wait: the spawned resolution keeps running and may still populate the
    /// cache.
    pub fn wait<F, T>(&self, future: F, deadline: Option<Duration>) -> Result<T, BlockingError>
    where
        F: Future<Output = ClientResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let deadline = deadline.unwrap_or(self.default_timeout);
        self.wait_inner(future, deadline).map_err(BlockingError::from)
    }

    fn wait_inner<F, T>(&self, future: F, deadline: Duration) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        if self.execution.is_shut_down() {
            return Err(ClientError::ShutDown);
        }

        let started = Instant::now();
        let execution = self.execution.clone();
        // `block_on` panics on threads that drive async tasks; the resolution
        // is spawned inside it so a rejected call never starts a fetch.
        let waited = panic::catch_unwind(AssertUnwindSafe(|| {
            self.execution.tokio().block_on(async move {
                let task = execution.spawn(future)?;
                Ok::<_, ClientError>(tokio::time::timeout(deadline, task).await)
            })
        }));
        let outcome = match waited {
            Ok(outcome) => outcome?,
            Err(_) if Handle::try_current().is_ok() => {
                return Err(ClientError::BlockingInAsyncContext);
            }
            Err(payload) => {
                return Err(ClientError::TaskFailed {
                    reason: panic_message(payload.as_ref()),
                });
            }
        };

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) if join_error.is_cancelled() => Err(ClientError::ShutDown),
            Ok(Err(join_error)) => Err(ClientError::TaskFailed {
                reason: join_error.to_string(),
            }),
            Err(_) => {
                warn!(
                    deadline_ms = deadline.as_millis() as u64,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Blocking resolution timed out"
                );
                Err(ClientError::Timeout { deadline })
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "blocking wait panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ExecutionContext;
    use lattice_core::TransportError;

    fn adapter(ctx: &ExecutionContext) -> BlockingAdapter {
        BlockingAdapter::new(ctx.handle().clone(), Duration::from_secs(1))
    }

    #[test]
    fn test_wait_returns_value() {
        let ctx = ExecutionContext::new(1).unwrap();
        let value = adapter(&ctx).wait(async { Ok(7) }, None).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_wait_wraps_failures() {
        let ctx = ExecutionContext::new(1).unwrap();
        let err = adapter(&ctx)
            .wait::<_, ()>(
                async {
                    Err(ClientError::from(TransportError::Request {
                        uri: "http://cd/Pages".to_string(),
                        reason: "connection refused".to_string(),
                    }))
                },
                None,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!err.is_timeout());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_wait_times_out() {
        let ctx = ExecutionContext::new(1).unwrap();
        let err = adapter(&ctx)
            .wait(
                async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                },
                Some(Duration::from_millis(20)),
            )
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_wait_after_shutdown() {
        let ctx = ExecutionContext::new(1).unwrap();
        let blocking = adapter(&ctx);
        ctx.shutdown(Duration::from_millis(100));
        let err = blocking.wait(async { Ok(()) }, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShutDown);
    }

    #[tokio::test]
    async fn test_wait_inside_async_context_is_rejected() {
        let ctx = ExecutionContext::from_handle(Handle::current());
        let err = adapter(&ctx).wait(async { Ok(()) }, None).unwrap_err();
        assert!(matches!(err.cause(), ClientError::BlockingInAsyncContext));
        assert_eq!(err.kind(), ErrorKind::Misuse);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_wait_inside_async_worker_on_multi_thread_is_rejected() {
        let ctx = ExecutionContext::from_handle(Handle::current());
        let err = adapter(&ctx).wait(async { Ok(()) }, None).unwrap_err();
        assert!(matches!(err.cause(), ClientError::BlockingInAsyncContext));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_wait_from_spawn_blocking_thread() {
        let ctx = ExecutionContext::from_handle(Handle::current());
        let blocking = adapter(&ctx);
        let value = tokio::task::spawn_blocking(move || {
            blocking.wait(
                async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(11)
                },
                None,
            )
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(value, 11);
    }
}
