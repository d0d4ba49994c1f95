//! Periodic tick sources that delimit throttle windows.

use std::time::{Duration, Instant};

use crate::control::ShutdownToken;

/// Something that can block until its next periodic tick.
pub trait TickSource {
    /// Block until the next tick. Returns `false` if shutdown was requested first.
    fn wait_tick(&mut self, shutdown: &ShutdownToken) -> bool;
}

/// Wall-clock ticker with a fixed phase: ticks fall at `start + k * period`.
///
/// If the caller arrives after a tick has already passed, that tick is
/// delivered immediately and any further missed ticks are dropped.
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    period: Duration,
    next: Instant,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next: Instant::now() + period,
        }
    }
}

impl TickSource for IntervalTicker {
    fn wait_tick(&mut self, shutdown: &ShutdownToken) -> bool {
        let now = Instant::now();
        if now < self.next {
            if !shutdown.sleep_until(self.next) {
                return false;
            }
            self.next += self.period;
            return true;
        }
        let behind = now.duration_since(self.next).as_nanos() / self.period.as_nanos();
        let skip = u32::try_from(behind).unwrap_or(u32::MAX).saturating_add(1);
        self.next += self.period.saturating_mul(skip);
        true
    }
}
