//! `trafd show-config` – print the resolved configuration.

use anyhow::{Context, Result};
use trafd_core::config::TrafdConfig;

pub fn run_show_config(cfg: &TrafdConfig) -> Result<()> {
    let text = cfg.to_toml().context("serialize config")?;
    print!("{}", text);
    Ok(())
}
