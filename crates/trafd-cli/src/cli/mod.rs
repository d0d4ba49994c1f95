//! CLI for trafd.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trafd_core::config::{self, ReportFormat, TrafdConfig};

use commands::{run_sample, run_show_config, run_traffic};

/// Top-level CLI. With no subcommand, `run` is assumed.
#[derive(Debug, Parser)]
#[command(name = "trafd")]
#[command(about = "trafd: rate-limited perpetual HTTP traffic generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// TOML config file (default: $XDG_CONFIG_HOME/trafd/config.toml if present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Flags that override the config file and environment.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Newline-delimited list of target URLs.
    #[arg(long, global = true, value_name = "PATH")]
    pub url_file: Option<PathBuf>,

    /// Per-worker speed limit in KB/s.
    #[arg(long, global = true, value_name = "KBPS")]
    pub speed_limit: Option<u64>,

    /// Number of concurrent download workers.
    #[arg(long, global = true, value_name = "N")]
    pub workers: Option<usize>,

    /// Seconds between telemetry reports.
    #[arg(long, global = true, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Network interface to report byte counters for.
    #[arg(long, global = true, value_name = "NAME")]
    pub interface: Option<String>,

    /// Per-fetch timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub fetch_timeout: Option<u64>,

    /// Telemetry report format: text or json.
    #[arg(long, global = true, value_name = "FORMAT")]
    pub report_format: Option<ReportFormat>,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut TrafdConfig) {
        if let Some(path) = &self.url_file {
            cfg.url_file = path.clone();
        }
        if let Some(v) = self.speed_limit {
            cfg.speed_limit_kbps = v;
        }
        if let Some(v) = self.workers {
            cfg.workers = v;
        }
        if let Some(v) = self.interval {
            cfg.interval_secs = v;
        }
        if let Some(name) = &self.interface {
            cfg.interface = name.clone();
        }
        if let Some(v) = self.fetch_timeout {
            cfg.fetch_timeout_secs = v;
        }
        if let Some(f) = self.report_format {
            cfg.report_format = f;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Start the download workers and the telemetry reporter; runs until interrupted.
    Run,

    /// Take one telemetry sample over one interval, print it, and exit.
    Sample,

    /// Print the resolved configuration as TOML.
    ShowConfig,
}

impl Cli {
    /// Config file, then environment, then flags; validated.
    pub fn resolve_config(&self) -> Result<TrafdConfig> {
        let mut cfg = config::load(self.config.as_deref())?;
        self.overrides.apply(&mut cfg);
        cfg.validate()?;
        tracing::debug!("resolved config: {:?}", cfg);
        Ok(cfg)
    }

    pub async fn run(self) -> Result<()> {
        let cfg = self.resolve_config()?;
        match self.command.unwrap_or(CliCommand::Run) {
            CliCommand::Run => run_traffic(cfg).await?,
            CliCommand::Sample => run_sample(cfg).await?,
            CliCommand::ShowConfig => run_show_config(&cfg)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
