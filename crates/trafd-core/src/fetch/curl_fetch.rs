//! libcurl-backed fetcher: one blocking `Easy` transfer per call.

use std::cell::Cell;
use std::time::Duration;

use super::{FetchError, FetchOutcome, Fetcher};
use crate::config::TrafdConfig;
use crate::control::ShutdownToken;
use crate::throttle::{SpeedThrottle, CHUNK_SIZE};

/// Blocking HTTP GET via libcurl. The body is counted and dropped in the
/// write callback; nothing is buffered beyond curl's receive buffer.
#[derive(Debug, Clone, Copy)]
pub struct CurlFetcher {
    timeout: Duration,
}

impl CurlFetcher {
    /// `timeout` bounds both connect and the whole transfer.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(cfg: &TrafdConfig) -> Self {
        Self::new(cfg.fetch_timeout())
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(
        &self,
        url: &str,
        throttle: &mut SpeedThrottle,
        shutdown: &ShutdownToken,
    ) -> Result<FetchOutcome, FetchError> {
        let received = Cell::new(0u64);
        let stopped = Cell::new(false);

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(FetchError::Request)?;
        easy.follow_location(true).map_err(FetchError::Request)?;
        easy.max_redirections(10).map_err(FetchError::Request)?;
        easy.connect_timeout(self.timeout)
            .map_err(FetchError::Request)?;
        // Hard wall-clock limit on the whole transfer, throttled reads included.
        easy.timeout(self.timeout).map_err(FetchError::Request)?;
        // Keeps every body chunk within one throttle chunk.
        easy.buffer_size(CHUNK_SIZE).map_err(FetchError::Request)?;
        easy.progress(true).map_err(FetchError::Request)?;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    received.set(received.get() + data.len() as u64);
                    if !throttle.record(data.len(), shutdown) {
                        stopped.set(true);
                        return Ok(0); // abort transfer
                    }
                    Ok(data.len())
                })
                .map_err(FetchError::Request)?;
            transfer
                .progress_function(|_, _, _, _| !shutdown.is_cancelled())
                .map_err(FetchError::Request)?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            if stopped.get() || shutdown.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            let received = received.get();
            if received == 0 {
                return Err(FetchError::Request(e));
            }
            return Err(FetchError::Interrupted { received, source: e });
        }

        let status = easy.response_code().map_err(FetchError::Request)?;
        Ok(FetchOutcome {
            bytes: received.get(),
            status,
        })
    }
}
