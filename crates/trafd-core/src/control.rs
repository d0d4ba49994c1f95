//! Cooperative shutdown: a shared flag that workers and the sampler check at
//! the top of every iteration and while they block.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep; bounds how late a cancelled sleeper notices.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Clonable cancellation token. All clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Sleep until `deadline`. Returns `false` if cancelled first.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }

    /// Sleep for `dur`. Returns `false` if cancelled first. A `dur` past the
    /// range of `Instant` sleeps until cancelled.
    pub fn sleep(&self, dur: Duration) -> bool {
        match Instant::now().checked_add(dur) {
            Some(deadline) => self.sleep_until(deadline),
            None => {
                while !self.is_cancelled() {
                    std::thread::sleep(SLEEP_SLICE);
                }
                false
            }
        }
    }
}
