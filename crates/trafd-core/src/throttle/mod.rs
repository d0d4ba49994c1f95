//! Per-worker speed throttle.
//!
//! Counts bytes as they are read. Once the count for the current window
//! reaches the limit, the reader blocks until the next one-second tick and
//! the count starts again from zero. Unused budget is not carried over, and
//! because the check happens after a whole chunk, a window can overshoot the
//! limit by less than one chunk. The result is an average ceiling per window,
//! not a smooth rate.

mod tick;

pub use tick::{IntervalTicker, TickSource};

use std::time::Duration;

use crate::control::ShutdownToken;

/// Largest body chunk handed to the throttle at once.
pub const CHUNK_SIZE: usize = 1024;

pub const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct SpeedThrottle<T = IntervalTicker> {
    limit_bytes: u64,
    window_bytes: u64,
    ticks: T,
}

impl SpeedThrottle<IntervalTicker> {
    /// Ceiling of `limit_kbps` KiB per one-second window.
    pub fn new(limit_kbps: u64) -> Self {
        Self::with_ticker(limit_kbps, IntervalTicker::new(WINDOW))
    }
}

impl<T: TickSource> SpeedThrottle<T> {
    pub fn with_ticker(limit_kbps: u64, ticks: T) -> Self {
        Self {
            limit_bytes: limit_kbps.max(1).saturating_mul(1024),
            window_bytes: 0,
            ticks,
        }
    }

    pub fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }

    /// Bytes counted in the current window.
    pub fn window_bytes(&self) -> u64 {
        self.window_bytes
    }

    /// Account for `n` bytes just read, blocking for the next tick if the
    /// window is full. Returns `false` if shutdown interrupted the wait.
    pub fn record(&mut self, n: usize, shutdown: &ShutdownToken) -> bool {
        self.window_bytes = self.window_bytes.saturating_add(n as u64);
        if self.window_bytes >= self.limit_bytes {
            if !self.ticks.wait_tick(shutdown) {
                return false;
            }
            self.window_bytes = 0;
        }
        true
    }
}
