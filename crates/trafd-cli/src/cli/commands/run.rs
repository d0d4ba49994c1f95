//! `trafd run` – start the worker pool and telemetry, run until a signal.

use anyhow::{Context, Result};
use std::sync::Arc;
use trafd_core::config::TrafdConfig;
use trafd_core::control::ShutdownToken;
use trafd_core::cursor::CursorCell;
use trafd_core::fetch::CurlFetcher;
use trafd_core::registry::UrlRegistry;
use trafd_core::telemetry::Sampler;
use trafd_core::worker::WorkerPool;

pub async fn run_traffic(cfg: TrafdConfig) -> Result<()> {
    let urls = UrlRegistry::load(&cfg.url_file)?;
    tracing::info!(
        "loaded {} URLs, workers: {}, speed limit: {}KB/s, telemetry interval: {}s, interface: {}",
        urls.len(),
        cfg.workers,
        cfg.speed_limit_kbps,
        cfg.interval_secs,
        cfg.interface
    );

    let shutdown = ShutdownToken::new();
    let cursor = Arc::new(CursorCell::new());

    let telemetry = Sampler::new(&cfg, Arc::clone(&cursor))
        .spawn(shutdown.clone())
        .context("failed to start telemetry thread")?;

    let fetcher = Arc::new(CurlFetcher::from_config(&cfg));
    let pool = match WorkerPool::spawn(&cfg, &urls, &cursor, fetcher, &shutdown) {
        Ok(pool) => pool,
        Err(e) => {
            shutdown.cancel();
            let _ = telemetry.join();
            return Err(e).context("failed to start download workers");
        }
    };

    wait_for_signal().await?;
    tracing::info!("shutdown requested, waiting for {} workers", pool.len());
    shutdown.cancel();

    tokio::task::spawn_blocking(move || {
        pool.join();
        if telemetry.join().is_err() {
            tracing::error!("telemetry thread panicked");
        }
    })
    .await
    .context("join worker threads")?;

    tracing::info!("stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("install SIGTERM handler")?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("wait for Ctrl-C")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.context("wait for Ctrl-C")?;
    Ok(())
}
