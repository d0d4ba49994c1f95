//! `trafd sample` – one telemetry report over one interval, then exit.

use anyhow::Result;
use std::sync::Arc;
use trafd_core::config::TrafdConfig;
use trafd_core::cursor::CursorCell;
use trafd_core::telemetry::Sampler;

pub async fn run_sample(cfg: TrafdConfig) -> Result<()> {
    let mut sampler = Sampler::new(&cfg, Arc::new(CursorCell::new()));
    tokio::time::sleep(sampler.interval()).await;
    sampler.sample().emit(cfg.report_format);
    Ok(())
}
