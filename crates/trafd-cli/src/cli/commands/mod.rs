//! CLI command handlers, one file per command.

mod run;
mod sample;
mod show_config;

pub use run::run_traffic;
pub use sample::run_sample;
pub use show_config::run_show_config;
