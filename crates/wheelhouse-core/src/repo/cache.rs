//! Resolution cache.
//!
//! Entries are keyed by (index host, category, package, optional version).
//! The store is a plain key-to-text map with TTL-aware reads; `JsonCache`
//! and `TextCache` layer the two value shapes on top of it. Reads that fail
//! count as misses and failed writes are logged, so a broken cache never
//! breaks resolution.

use super::error::RepoError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use wheelhouse_util::fs::{atomic_write, file_age};
use wheelhouse_util::hash::short_digest;

/// Category tag for index link listings.
pub const LINKS_CATEGORY: &str = "links";

/// Category tag for extracted dependency lists.
pub const DEPS_CATEGORY: &str = "deps";

/// Compound cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub host: String,
    pub category: &'static str,
    pub package: String,
    pub version: Option<String>,
}

impl CacheKey {
    /// Key for the link listing of `package` on `host`.
    #[must_use]
    pub fn links(host: &str, package: &str) -> Self {
        Self {
            host: host.to_string(),
            category: LINKS_CATEGORY,
            package: package.to_string(),
            version: None,
        }
    }

    /// Key for the dependencies of `package` at `version` on `host`.
    #[must_use]
    pub fn deps(host: &str, package: &str, version: &str) -> Self {
        Self {
            host: host.to_string(),
            category: DEPS_CATEGORY,
            package: package.to_string(),
            version: Some(version.to_string()),
        }
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        [self.host.as_str(), self.category, self.package.as_str()]
            .into_iter()
            .chain(self.version.as_deref())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.segments().collect();
        f.write_str(&parts.join("/"))
    }
}

/// Persistent key-to-text store.
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Read an entry. Entries older than `ttl` are reported as absent.
    ///
    /// # Errors
    /// Returns an error if the entry exists but cannot be read.
    fn load(&self, key: &CacheKey, ttl: Option<Duration>) -> Result<Option<String>, RepoError>;

    /// Write an entry, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the entry cannot be written.
    fn dump(&self, key: &CacheKey, value: &str) -> Result<(), RepoError>;
}

/// Cache store backed by a directory tree: `root/<host>/<category>/<package>[/<version>]`.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let mut path = self.root.clone();
        for segment in key.segments() {
            path.push(Self::encode_segment(segment));
        }
        path
    }

    /// Keep safe segments readable, hash anything that could escape the root.
    fn encode_segment(segment: &str) -> String {
        let safe = !segment.is_empty()
            && !segment.starts_with('.')
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '!'));
        if safe {
            segment.to_string()
        } else {
            format!("~{}", short_digest(segment.as_bytes(), 32))
        }
    }
}

impl CacheStore for FsCacheStore {
    fn load(&self, key: &CacheKey, ttl: Option<Duration>) -> Result<Option<String>, RepoError> {
        let path = self.entry_path(key);

        if let Some(ttl) = ttl {
            match file_age(&path) {
                Ok(age) if age > ttl => {
                    debug!(key = %key, age_secs = age.as_secs(), "Cache entry expired");
                    return Ok(None);
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }

        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepoError::cache_error(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn dump(&self, key: &CacheKey, value: &str) -> Result<(), RepoError> {
        let path = self.entry_path(key);
        atomic_write(&path, value.as_bytes()).map_err(|e| {
            RepoError::cache_error(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

/// Cache of serde values, stored as JSON.
#[derive(Debug)]
pub struct JsonCache<T> {
    store: Arc<dyn CacheStore>,
    key: CacheKey,
    ttl: Option<Duration>,
    _value: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonCache<T> {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, key: CacheKey, ttl: Option<Duration>) -> Self {
        Self {
            store,
            key,
            ttl,
            _value: PhantomData,
        }
    }

    /// Cached value, or `None` on a miss, an expired entry or a corrupt entry.
    #[must_use]
    pub fn load(&self) -> Option<T> {
        let text = match self.store.load(&self.key, self.ttl) {
            Ok(text) => text?,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable cache entry");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring corrupt cache entry");
                None
            }
        }
    }

    /// Store `value`; failures are logged, not returned.
    pub fn dump(&self, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(RepoError::from)
            .and_then(|text| self.store.dump(&self.key, &text));
        if let Err(e) = result {
            warn!(key = %self.key, error = %e, "Failed to write cache entry");
        }
    }
}

/// Cache of string lists, stored one item per line.
///
/// `load` distinguishes a missing entry (`None`) from an entry recorded with
/// no items (`Some(vec![])`, an empty file).
#[derive(Debug)]
pub struct TextCache {
    store: Arc<dyn CacheStore>,
    key: CacheKey,
    ttl: Option<Duration>,
}

impl TextCache {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, key: CacheKey, ttl: Option<Duration>) -> Self {
        Self { store, key, ttl }
    }

    #[must_use]
    pub fn load(&self) -> Option<Vec<String>> {
        match self.store.load(&self.key, self.ttl) {
            Ok(text) => text.map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect()
            }),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Store `items`; failures are logged, not returned.
    pub fn dump(&self, items: &[String]) {
        if let Err(e) = self.store.dump(&self.key, &items.join("\n")) {
            warn!(key = %self.key, error = %e, "Failed to write cache entry");
        }
    }
}
