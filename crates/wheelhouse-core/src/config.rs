use crate::error::Error;
use crate::paths::cache_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Default simple index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple/";

/// Environment variable to override the index URL.
pub const INDEX_URL_ENV: &str = "WHEELHOUSE_INDEX_URL";

/// Default lifetime of cached index listings, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Runtime configuration for wheelhouse.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the simple index.
    pub index_url: String,

    /// Symbolic name of the repository (`pypi`, `internal`, ...).
    pub index_name: String,

    /// Include prereleases in every release listing.
    pub prereleases: bool,

    /// Lifetime of cached link listings.
    pub cache_ttl_secs: u64,

    /// Override for the cache root. Defaults to the platform cache directory.
    pub cache_dir: Option<PathBuf>,

    /// Channel (dev, nightly, stable) - affects cache paths.
    pub channel: Channel,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE).
    pub verbosity: u8,
}

/// Release channel for cache directory namespacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Stable,
    Nightly,
    Dev,
}

impl Channel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Nightly => "nightly",
            Self::Dev => "dev",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            index_name: "pypi".to_string(),
            prereleases: false,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_dir: None,
            channel: Channel::default(),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Load a config from a JSON file.
    ///
    /// # Errors
    /// Returns `ConfigRead` if the file cannot be read and `ConfigParse` if it
    /// is not valid JSON for this structure.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides (`WHEELHOUSE_INDEX_URL`).
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(INDEX_URL_ENV) {
            if !url.trim().is_empty() {
                self.index_url = url.trim().to_string();
            }
        }
        self
    }

    /// Set the index URL.
    #[must_use]
    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    /// Set the cache root.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    /// Allow prereleases repository-wide.
    #[must_use]
    pub fn with_prereleases(mut self, prereleases: bool) -> Self {
        self.prereleases = prereleases;
        self
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Lifetime of cached link listings.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Log level for wheelhouse's own crates, from [`Self::verbosity`].
    #[must_use]
    pub fn log_level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Effective cache root: the override if set, else the channel cache dir.
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| cache_dir(self.channel).join("index"))
    }
}
