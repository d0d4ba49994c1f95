pub mod config;
pub mod logging;

pub mod control;
pub mod cursor;
pub mod fetch;
pub mod registry;
pub mod telemetry;
pub mod throttle;
pub mod worker;
