//! Network interface byte counters and the per-tick rate derived from them.

use serde::Serialize;
use std::time::Duration;

/// Cumulative bytes received/sent on one interface since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NetCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Throughput over one sampling interval, in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NetRate {
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
}

impl NetCounters {
    /// Rate since `previous` over `interval`. A counter that went backwards
    /// (reset or wrap) yields zero for that direction.
    pub fn rate_since(&self, previous: &NetCounters, interval: Duration) -> NetRate {
        let secs = interval.as_secs_f64();
        if secs <= 0.0 {
            return NetRate::default();
        }
        NetRate {
            rx_bytes_per_sec: self.rx_bytes.saturating_sub(previous.rx_bytes) as f64 / secs,
            tx_bytes_per_sec: self.tx_bytes.saturating_sub(previous.tx_bytes) as f64 / secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_delta_over_interval() {
        let before = NetCounters {
            rx_bytes: 1_000_000,
            tx_bytes: 500_000,
        };
        let after = NetCounters {
            rx_bytes: 6_000_000,
            tx_bytes: 1_500_000,
        };
        let rate = after.rate_since(&before, Duration::from_secs(5));
        assert!((rate.rx_bytes_per_sec - 1_000_000.0).abs() < 1e-6);
        assert!((rate.tx_bytes_per_sec - 200_000.0).abs() < 1e-6);
    }

    #[test]
    fn counter_reset_clamps_to_zero() {
        let before = NetCounters {
            rx_bytes: 9_000,
            tx_bytes: 100,
        };
        let after = NetCounters {
            rx_bytes: 10,
            tx_bytes: 600,
        };
        let rate = after.rate_since(&before, Duration::from_secs(5));
        assert_eq!(rate.rx_bytes_per_sec, 0.0);
        assert!((rate.tx_bytes_per_sec - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_interval_yields_zero_rate() {
        let c = NetCounters {
            rx_bytes: 10,
            tx_bytes: 10,
        };
        assert_eq!(c.rate_since(&NetCounters::default(), Duration::ZERO), NetRate::default());
    }
}
