//! Worker pool shared by all decisions of an engine.
//!
//! The pool is an explicit service object: it is built once, handed to
//! every [`DecisionEngine`](super::DecisionEngine) that should share it, and
//! shut down explicitly. Clones refer to the same threads.

use std::sync::Arc;

use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use super::config::SearchConfig;
use super::error::{ConfigError, SearchError};

#[derive(Clone, Debug)]
pub struct WorkerPool {
    inner: Arc<Mutex<Option<Arc<ThreadPool>>>>,
    threads: usize,
}

impl WorkerPool {
    /// Build a pool with `threads` workers.
    pub fn new(threads: usize) -> Result<Self, SearchError> {
        if threads == 0 {
            return Err(ConfigError::ZeroThreads.into());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ismcts-worker-{i}"))
            .build()
            .map_err(|e| SearchError::PoolBuild(e.to_string()))?;
        debug!(threads, "worker pool started");
        Ok(Self {
            inner: Arc::new(Mutex::new(Some(Arc::new(pool)))),
            threads,
        })
    }

    /// Pool sized for `config`.
    pub fn for_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::new(config.pool_threads())
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Thread pool for one decision. Fails once the pool is shut down.
    pub fn handle(&self) -> Result<Arc<ThreadPool>, SearchError> {
        self.inner.lock().clone().ok_or(SearchError::PoolShutDown)
    }

    /// Release the workers. Decisions already running keep their handle
    /// and finish; later ones fail with [`SearchError::PoolShutDown`].
    /// Calling this more than once is harmless.
    pub fn shutdown(&self) {
        if self.inner.lock().take().is_some() {
            info!(threads = self.threads, "worker pool shut down");
        }
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().is_none()
    }
}
