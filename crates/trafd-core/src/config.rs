//! Runtime configuration: built-in defaults, an optional TOML file, then
//! environment overrides. The CLI applies its flags on top and validates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_URL_FILE: &str = "/data/url.txt";

/// Upper bounds accepted by [`TrafdConfig::validate`].
pub const MAX_WORKERS: usize = 4096;
pub const MAX_INTERVAL_SECS: u64 = 86_400;
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 86_400;

pub const ENV_URL_FILE: &str = "URL_FILE";
pub const ENV_SPEED_LIMIT: &str = "DOWNLOAD_SPEED_LIMIT";
pub const ENV_WORKERS: &str = "THREADS";
pub const ENV_INTERVAL: &str = "SLEEP_INTERVAL";
pub const ENV_INTERFACE: &str = "NET_INTERFACE";
pub const ENV_REPORT_FORMAT: &str = "REPORT_FORMAT";

/// Errors that make the process unable to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("URL list is empty: {}", .path.display())]
    EmptyUrlList { path: PathBuf },
    #[error("cannot locate XDG directories: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

/// How telemetry reports are written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Banner-framed block, one log line per field.
    #[default]
    Text,
    /// One JSON object per tick.
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format {:?} (expected text or json)", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}

/// Resolved configuration. Immutable once the process starts its threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafdConfig {
    /// Newline-delimited list of target URLs.
    pub url_file: PathBuf,
    /// Per-worker throughput ceiling in KiB/s.
    pub speed_limit_kbps: u64,
    /// Number of concurrent download workers.
    pub workers: usize,
    /// Seconds between telemetry reports.
    pub interval_secs: u64,
    /// Network interface whose byte counters are reported.
    pub interface: String,
    /// Connect and overall timeout for one fetch, in seconds.
    pub fetch_timeout_secs: u64,
    pub report_format: ReportFormat,
    /// Mount point of procfs (overridable for tests).
    pub proc_root: PathBuf,
}

impl Default for TrafdConfig {
    fn default() -> Self {
        Self {
            url_file: PathBuf::from(DEFAULT_URL_FILE),
            speed_limit_kbps: 200,
            workers: 2,
            interval_secs: 5,
            interface: "eth0".to_string(),
            fetch_timeout_secs: 60,
            report_format: ReportFormat::Text,
            proc_root: PathBuf::from("/proc"),
        }
    }
}

impl TrafdConfig {
    /// Per-worker ceiling in bytes per one-second window.
    pub fn speed_limit_bytes(&self) -> u64 {
        self.speed_limit_kbps.saturating_mul(1024)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Apply environment overrides. Empty values are ignored; values that do
    /// not parse are logged and ignored so the previous value stays in effect.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env_value(&lookup, ENV_URL_FILE) {
            self.url_file = PathBuf::from(v);
        }
        env_parse(&lookup, ENV_SPEED_LIMIT, &mut self.speed_limit_kbps);
        env_parse(&lookup, ENV_WORKERS, &mut self.workers);
        env_parse(&lookup, ENV_INTERVAL, &mut self.interval_secs);
        if let Some(v) = env_value(&lookup, ENV_INTERFACE) {
            self.interface = v;
        }
        env_parse(&lookup, ENV_REPORT_FORMAT, &mut self.report_format);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.speed_limit_kbps == 0 {
            return Err(ConfigError::Invalid("speed limit must be at least 1 KB/s".into()));
        }
        if self.interval_secs == 0 || self.interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "telemetry interval must be between 1s and {}s, got {}s",
                MAX_INTERVAL_SECS, self.interval_secs
            )));
        }
        if self.fetch_timeout_secs == 0 || self.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "fetch timeout must be between 1s and {}s, got {}s",
                MAX_FETCH_TIMEOUT_SECS, self.fetch_timeout_secs
            )));
        }
        if self.interface.trim().is_empty() {
            return Err(ConfigError::Invalid("network interface name is empty".into()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn env_value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = env_value(lookup, key) else {
        return;
    };
    match raw.parse::<T>() {
        Ok(v) => *slot = v,
        Err(e) => tracing::warn!("ignoring {}={:?}: {}", key, raw, e),
    }
}

/// Path of the XDG config file, if one exists. Never creates it.
pub fn config_path() -> Result<Option<PathBuf>, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("trafd")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Parse a TOML config file; keys it omits keep their defaults.
pub fn load_file(path: &Path) -> Result<TrafdConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&data)?)
}

/// Defaults, then `explicit` (or the XDG config file when present), then the
/// process environment.
pub fn load(explicit: Option<&Path>) -> Result<TrafdConfig, ConfigError> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config_path().unwrap_or_else(|e| {
            tracing::debug!("no XDG config lookup: {}", e);
            None
        }),
    };
    let mut cfg = match path {
        Some(p) => {
            tracing::debug!("loading config from {}", p.display());
            load_file(&p)?
        }
        None => TrafdConfig::default(),
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = TrafdConfig::default();
        assert_eq!(cfg.url_file, PathBuf::from("/data/url.txt"));
        assert_eq!(cfg.speed_limit_kbps, 200);
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.interval_secs, 5);
        assert_eq!(cfg.interface, "eth0");
        assert_eq!(cfg.fetch_timeout_secs, 60);
        assert_eq!(cfg.speed_limit_bytes(), 200 * 1024);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_partial_keeps_defaults() {
        let toml = r#"
            workers = 8
            interface = "ens3"
            report_format = "json"
        "#;
        let cfg: TrafdConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.workers, 8);
        assert_eq!(cfg.interface, "ens3");
        assert_eq!(cfg.report_format, ReportFormat::Json);
        assert_eq!(cfg.speed_limit_kbps, 200);
        assert_eq!(cfg.interval_secs, 5);
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = TrafdConfig::default();
        cfg.workers = 3;
        let text = cfg.to_toml().unwrap();
        let parsed: TrafdConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = TrafdConfig::default();
        cfg.apply_env(env(&[
            ("URL_FILE", "/tmp/urls.txt"),
            ("DOWNLOAD_SPEED_LIMIT", "512"),
            ("THREADS", " 4 "),
            ("SLEEP_INTERVAL", "10"),
            ("NET_INTERFACE", "wlan0"),
            ("REPORT_FORMAT", "JSON"),
        ]));
        assert_eq!(cfg.url_file, PathBuf::from("/tmp/urls.txt"));
        assert_eq!(cfg.speed_limit_kbps, 512);
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.interval_secs, 10);
        assert_eq!(cfg.interface, "wlan0");
        assert_eq!(cfg.report_format, ReportFormat::Json);
    }

    #[test]
    fn env_unparseable_or_empty_values_are_ignored() {
        let mut cfg = TrafdConfig::default();
        cfg.workers = 6;
        cfg.apply_env(env(&[
            ("THREADS", "many"),
            ("DOWNLOAD_SPEED_LIMIT", "-5"),
            ("URL_FILE", ""),
            ("REPORT_FORMAT", "xml"),
        ]));
        assert_eq!(cfg.workers, 6);
        assert_eq!(cfg.speed_limit_kbps, 200);
        assert_eq!(cfg.url_file, PathBuf::from(DEFAULT_URL_FILE));
        assert_eq!(cfg.report_format, ReportFormat::Text);
    }

    #[test]
    fn validate_rejects_zero_values() {
        let mut cfg = TrafdConfig::default();
        cfg.workers = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = TrafdConfig::default();
        cfg.speed_limit_kbps = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrafdConfig::default();
        cfg.interval_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrafdConfig::default();
        cfg.interface = "  ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_env_values() {
        let mut cfg = TrafdConfig::default();
        cfg.apply_env(env(&[("SLEEP_INTERVAL", "18446744073709551615")]));
        assert_eq!(cfg.interval_secs, u64::MAX);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let threads = usize::MAX.to_string();
        let mut cfg = TrafdConfig::default();
        cfg.apply_env(env(&[("THREADS", threads.as_str())]));
        assert_eq!(cfg.workers, usize::MAX);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        let mut cfg = TrafdConfig::default();
        cfg.fetch_timeout_secs = MAX_FETCH_TIMEOUT_SECS + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_upper_bounds() {
        let cfg = TrafdConfig {
            workers: MAX_WORKERS,
            interval_secs: MAX_INTERVAL_SECS,
            fetch_timeout_secs: MAX_FETCH_TIMEOUT_SECS,
            ..TrafdConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        match load_file(&missing) {
            Err(ConfigError::Read { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Read error, got {:?}", other),
        }
    }

    #[test]
    fn load_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "workers = \"two\"").unwrap();
        assert!(matches!(load_file(&path), Err(ConfigError::Parse(_))));
    }
}
