//! Readers for the procfs files the sampler consumes.
//!
//! The root is configurable so tests can point it at a fixture directory.
//! Parsers are split from file access and return `None` on malformed input.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use super::net::NetCounters;

/// Host load average over 1, 5 and 15 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl fmt::Display for LoadAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {:.2} {:.2}", self.one, self.five, self.fifteen)
    }
}

/// Aggregate CPU time counters since boot, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub total: u64,
    pub idle: u64,
}

impl CpuTimes {
    /// Share of non-idle time since boot, in percent. This is a cumulative
    /// ratio from one snapshot, not the usage over the last interval.
    pub fn busy_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.total.saturating_sub(self.idle) as f64 / self.total as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, rel: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(rel))
    }

    pub fn load_average(&self) -> io::Result<LoadAverage> {
        parse_loadavg(&self.read("loadavg")?).ok_or_else(|| malformed("loadavg"))
    }

    pub fn cpu_times(&self) -> io::Result<CpuTimes> {
        parse_cpu_times(&self.read("stat")?).ok_or_else(|| malformed("stat"))
    }

    /// Cumulative byte counters for `interface`. NotFound if it is not listed.
    pub fn net_counters(&self, interface: &str) -> io::Result<NetCounters> {
        parse_net_dev(&self.read("net/dev")?, interface).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("interface {} not in net/dev", interface),
            )
        })
    }

    /// Resident set size of this process, in bytes.
    pub fn resident_bytes(&self) -> io::Result<u64> {
        parse_vm_rss(&self.read("self/status")?).ok_or_else(|| malformed("self/status"))
    }
}

fn malformed(file: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("unexpected {} format", file))
}

pub fn parse_loadavg(text: &str) -> Option<LoadAverage> {
    let mut fields = text.split_whitespace().map(|f| f.parse::<f64>().ok());
    Some(LoadAverage {
        one: fields.next()??,
        five: fields.next()??,
        fifteen: fields.next()??,
    })
}

/// Reads the aggregate `cpu` line: idle is the fourth counter, total the sum.
pub fn parse_cpu_times(text: &str) -> Option<CpuTimes> {
    let line = text.lines().find(|l| l.starts_with("cpu "))?;
    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse::<u64>().ok())
        .collect::<Option<_>>()?;
    let idle = *values.get(3)?;
    Some(CpuTimes {
        total: values.iter().fold(0u64, |acc, v| acc.saturating_add(*v)),
        idle,
    })
}

/// Finds `interface` in net/dev; received bytes is the first counter, sent the ninth.
pub fn parse_net_dev(text: &str, interface: &str) -> Option<NetCounters> {
    text.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != interface {
            return None;
        }
        let fields: Vec<&str> = rest.split_whitespace().collect();
        Some(NetCounters {
            rx_bytes: fields.first()?.parse().ok()?,
            tx_bytes: fields.get(8)?.parse().ok()?,
        })
    })
}

/// `VmRSS:   1234 kB` from `/proc/self/status`, converted to bytes.
pub fn parse_vm_rss(text: &str) -> Option<u64> {
    let line = text.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line["VmRSS:".len()..].split_whitespace().next()?.parse().ok()?;
    Some(kb.saturating_mul(1024))
}
