//! Download workers: N OS threads, each striding through the URL list forever
//! (until shutdown), fetching through its own speed throttle.

mod stride;

pub use stride::StrideCursor;

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::{TrafdConfig, MAX_WORKERS};
use crate::control::ShutdownToken;
use crate::cursor::CursorCell;
use crate::fetch::{FetchError, Fetcher};
use crate::registry::UrlRegistry;
use crate::throttle::SpeedThrottle;

/// One download worker. Owns its stride position and throttle; shares the
/// URL list, cursor cell and fetcher with the rest of the pool.
pub struct Worker<F> {
    id: usize,
    stride: StrideCursor,
    urls: UrlRegistry,
    cursor: Arc<CursorCell>,
    fetcher: Arc<F>,
    throttle: SpeedThrottle,
    shutdown: ShutdownToken,
}

impl<F: Fetcher> Worker<F> {
    pub fn new(
        id: usize,
        cfg: &TrafdConfig,
        urls: UrlRegistry,
        cursor: Arc<CursorCell>,
        fetcher: Arc<F>,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            id,
            stride: StrideCursor::new(id, cfg.workers, urls.len()),
            urls,
            cursor,
            fetcher,
            throttle: SpeedThrottle::new(cfg.speed_limit_kbps),
            shutdown,
        }
    }

    /// Fetch loop. Failures are logged and the next URL is tried at once;
    /// only shutdown ends the loop.
    pub fn run(mut self) {
        tracing::debug!(worker = self.id, "worker started");
        while !self.shutdown.is_cancelled() {
            let url = Arc::clone(self.urls.at(self.stride.next_index()));
            self.cursor.publish(Arc::clone(&url));

            match self.fetcher.fetch(&url, &mut self.throttle, &self.shutdown) {
                Ok(outcome) => tracing::debug!(
                    worker = self.id,
                    url = %url,
                    bytes = outcome.bytes,
                    status = outcome.status,
                    "fetch complete"
                ),
                Err(FetchError::Cancelled) => break,
                Err(e @ FetchError::Request(_)) => {
                    tracing::error!("worker {} request failed: {}: {}", self.id, url, e)
                }
                Err(e @ FetchError::Interrupted { .. }) => {
                    tracing::error!("worker {} download interrupted: {}: {}", self.id, url, e)
                }
            }
        }
        tracing::debug!(worker = self.id, "worker stopped");
    }
}

/// Handles of the running worker threads.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `cfg.workers` threads named `trafd-worker-{id}`. On spawn failure
    /// the already-started workers are cancelled via `shutdown`.
    pub fn spawn<F>(
        cfg: &TrafdConfig,
        urls: &UrlRegistry,
        cursor: &Arc<CursorCell>,
        fetcher: Arc<F>,
        shutdown: &ShutdownToken,
    ) -> io::Result<Self>
    where
        F: Fetcher + 'static,
    {
        let mut handles = Vec::with_capacity(cfg.workers.min(MAX_WORKERS));
        for id in 0..cfg.workers {
            let worker = Worker::new(
                id,
                cfg,
                urls.clone(),
                Arc::clone(cursor),
                Arc::clone(&fetcher),
                shutdown.clone(),
            );
            let spawned = std::thread::Builder::new()
                .name(format!("trafd-worker-{}", id))
                .spawn(move || worker.run());
            match spawned {
                Ok(h) => handles.push(h),
                Err(e) => {
                    shutdown.cancel();
                    WorkerPool { handles }.join();
                    return Err(e);
                }
            }
        }
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit (they only do after shutdown).
    pub fn join(self) {
        for h in self.handles {
            let name = h.thread().name().unwrap_or("worker").to_string();
            if h.join().is_err() {
                tracing::error!("{} panicked", name);
            }
        }
    }
}
