//! Telemetry sampler: every interval, reads process memory, host CPU ratio,
//! load average and interface byte counters, and logs one report together
//! with the URL currently in flight.
//!
//! Each field degrades on its own: a failed read becomes zero (or "unknown"
//! for the load average) and never aborts the tick.

mod net;
mod procfs;

pub use net::{NetCounters, NetRate};
pub use procfs::{CpuTimes, LoadAverage, ProcFs};

use serde::Serialize;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::{ReportFormat, TrafdConfig};
use crate::control::ShutdownToken;
use crate::cursor::CursorCell;

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = MIB * 1024.0;
const BANNER: &str =
    "******************************************************************************************";

/// One telemetry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReport {
    pub current_url: String,
    pub workers: usize,
    /// Resident set size of this process.
    pub memory_bytes: u64,
    /// Cumulative non-idle CPU share since boot.
    pub cpu_percent: f64,
    /// `None` when the load average could not be read.
    pub load_average: Option<LoadAverage>,
    pub interface: String,
    pub counters: NetCounters,
    pub rate: NetRate,
}

impl TelemetryReport {
    /// Human-readable block, one entry per log line.
    pub fn text_lines(&self) -> Vec<String> {
        let load = self
            .load_average
            .map(|la| la.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        vec![
            BANNER.to_string(),
            format!("** current url: {}", self.current_url),
            format!("** workers: {}", self.workers),
            format!("** memory: {:.2}MB", self.memory_bytes as f64 / MIB),
            format!("** cpu: {:.3}%", self.cpu_percent),
            format!("** load average: {}", load),
            format!(
                "** interface: {} rx: {:.3}GB ({:.3}MB/s) tx: {:.3}MB ({:.3}MB/s)",
                self.interface,
                self.counters.rx_bytes as f64 / GIB,
                self.rate.rx_bytes_per_sec / MIB,
                self.counters.tx_bytes as f64 / MIB,
                self.rate.tx_bytes_per_sec / MIB,
            ),
            BANNER.to_string(),
        ]
    }

    /// Write the report to the log at info level.
    pub fn emit(&self, format: ReportFormat) {
        match format {
            ReportFormat::Text => {
                for line in self.text_lines() {
                    tracing::info!("{}", line);
                }
            }
            ReportFormat::Json => match serde_json::to_string(self) {
                Ok(json) => tracing::info!("{}", json),
                Err(e) => tracing::warn!("failed to serialize telemetry report: {}", e),
            },
        }
    }
}

/// Periodic telemetry loop state. Holds the previous counter snapshot so each
/// tick can report a rate.
pub struct Sampler {
    procfs: ProcFs,
    interface: String,
    interval: Duration,
    workers: usize,
    format: ReportFormat,
    cursor: Arc<CursorCell>,
    previous: NetCounters,
}

impl Sampler {
    /// Takes the initial counter snapshot immediately.
    pub fn new(cfg: &TrafdConfig, cursor: Arc<CursorCell>) -> Self {
        let procfs = ProcFs::new(&cfg.proc_root);
        let previous = read_counters(&procfs, &cfg.interface);
        Self {
            procfs,
            interface: cfg.interface.clone(),
            interval: cfg.interval(),
            workers: cfg.workers,
            format: cfg.report_format,
            cursor,
            previous,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Read everything once. The rate divides the counter delta by the
    /// configured interval, and the current counters become the new baseline.
    pub fn sample(&mut self) -> TelemetryReport {
        let memory_bytes = self.procfs.resident_bytes().unwrap_or_else(|e| {
            tracing::debug!("memory read failed: {}", e);
            0
        });
        let cpu_percent = match self.procfs.cpu_times() {
            Ok(times) => times.busy_percent(),
            Err(e) => {
                tracing::debug!("cpu read failed: {}", e);
                0.0
            }
        };
        let load_average = match self.procfs.load_average() {
            Ok(la) => Some(la),
            Err(e) => {
                tracing::debug!("load average read failed: {}", e);
                None
            }
        };
        let counters = read_counters(&self.procfs, &self.interface);
        let rate = counters.rate_since(&self.previous, self.interval);
        self.previous = counters;

        TelemetryReport {
            current_url: self.cursor.current().to_string(),
            workers: self.workers,
            memory_bytes,
            cpu_percent,
            load_average,
            interface: self.interface.clone(),
            counters,
            rate,
        }
    }

    /// Sample and report every interval until shutdown.
    pub fn run(mut self, shutdown: ShutdownToken) {
        while !shutdown.is_cancelled() {
            self.sample().emit(self.format);
            if !shutdown.sleep(self.interval) {
                break;
            }
        }
        tracing::debug!("telemetry stopped");
    }

    /// Run on a dedicated thread named `trafd-telemetry`.
    pub fn spawn(self, shutdown: ShutdownToken) -> io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("trafd-telemetry".to_string())
            .spawn(move || self.run(shutdown))
    }
}

fn read_counters(procfs: &ProcFs, interface: &str) -> NetCounters {
    procfs.net_counters(interface).unwrap_or_else(|e| {
        tracing::debug!("net counters read failed: {}", e);
        NetCounters::default()
    })
}
