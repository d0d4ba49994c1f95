//! URL registry: the ordered, read-only list of download targets.
//!
//! Loaded once at startup from a newline-delimited file. Lines are trimmed,
//! blank lines dropped, order kept. Workers share the list without locking.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::ConfigError;

/// Split file contents into trimmed, non-empty lines in original order.
pub fn parse_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read and parse the URL file. An empty result is returned as-is; callers
/// that need at least one target use [`UrlRegistry::load`].
pub fn load(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_urls(&text);
    for line in &urls {
        // Kept regardless; the fetch will fail and be logged each time it comes up.
        if url::Url::parse(line).is_err() {
            tracing::warn!("{}: {:?} does not parse as a URL", path.display(), line);
        }
    }
    Ok(urls)
}

/// Non-empty, immutable list of targets. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct UrlRegistry {
    urls: Arc<[Arc<str>]>,
}

impl UrlRegistry {
    /// Build from an already-loaded list. `source` names the origin for the error.
    pub fn from_urls(urls: Vec<String>, source: &Path) -> Result<Self, ConfigError> {
        if urls.is_empty() {
            return Err(ConfigError::EmptyUrlList {
                path: source.to_path_buf(),
            });
        }
        Ok(Self {
            urls: urls.into_iter().map(Arc::from).collect(),
        })
    }

    /// Load from `path`; fails if the file is unreadable or holds no URLs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_urls(load(path)?, path)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Always false; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URL at `index` modulo the list length.
    pub fn at(&self, index: usize) -> &Arc<str> {
        &self.urls[index % self.urls.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(|u| &**u)
    }
}
