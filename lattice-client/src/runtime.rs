//! Execution context driving fetches and resolution composition.
//!
//! One context per client. It either owns a tokio multi-thread runtime or
//! borrows the handle of a runtime the caller already runs.

use lattice_core::{ClientError, ClientResult};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Clonable handle that references use to spawn resolutions.
#[derive(Debug, Clone)]
pub struct ExecutionHandle {
    handle: Handle,
    shut_down: Arc<AtomicBool>,
}

impl ExecutionHandle {
    /// Spawn `future` onto the context. Fails once the context is shut down.
    pub fn spawn<F>(&self, future: F) -> ClientResult<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if self.is_shut_down() {
            return Err(ClientError::ShutDown);
        }
        Ok(self.handle.spawn(future))
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// The underlying tokio handle.
    pub fn tokio(&self) -> &Handle {
        &self.handle
    }
}

/// Owner of the runtime behind an [`ExecutionHandle`].
pub struct ExecutionContext {
    runtime: Mutex<Option<Runtime>>,
    handle: ExecutionHandle,
}

impl ExecutionContext {
    /// Start a multi-thread runtime. `worker_threads == 0` keeps tokio's default.
    pub fn new(worker_threads: usize) -> ClientResult<Self> {
        let mut builder = Builder::new_multi_thread();
        if worker_threads > 0 {
            builder.worker_threads(worker_threads);
        }
        let runtime = builder
            .enable_all()
            .thread_name("lattice-worker")
            .build()
            .map_err(|e| ClientError::Runtime {
                reason: e.to_string(),
            })?;
        let handle = runtime.handle().clone();
        debug!(worker_threads, "Execution context started");
        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            handle: ExecutionHandle {
                handle,
                shut_down: Arc::new(AtomicBool::new(false)),
            },
        })
    }

    /// Borrow a runtime the caller owns. Shutting this context down only stops
    /// new work from being spawned through it; the runtime keeps running.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            runtime: Mutex::new(None),
            handle: ExecutionHandle {
                handle,
                shut_down: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    pub fn handle(&self) -> &ExecutionHandle {
        &self.handle
    }

    pub fn is_owned(&self) -> bool {
        self.runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Shut the context down. Returns `false` if it was already shut down.
    ///
    /// An owned runtime waits up to `timeout` for in-flight tasks, or is torn
    /// down in the background when called from inside an async context.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        if self.handle.shut_down.swap(true, Ordering::AcqRel) {
            return false;
        }
        let runtime = self
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            } else {
                runtime.shutdown_timeout(timeout);
            }
        }
        info!("Execution context shut down");
        true
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("owned", &self.is_owned())
            .field("shut_down", &self.handle.is_shut_down())
            .finish()
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.handle.shut_down.store(true, Ordering::Release);
        let runtime = self
            .runtime
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
        }
    }
}
