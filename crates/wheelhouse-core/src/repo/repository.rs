//! Simple index repository.
//!
//! Release discovery: link cache → index page → aggregation.
//! Dependency discovery: deps cache → link cache → artifact selection →
//! download → converter → deps cache → extra filtering.

use super::cache::{CacheKey, CacheStore, FsCacheStore, JsonCache, TextCache};
use super::config::RepoConfig;
use super::convert::Converters;
use super::download::{download_artifact, MAX_ARTIFACT_SIZE};
use super::error::{ExtractError, RepoError};
use super::links::{self, LinkRecord};
use super::release::{aggregate, Release, ReleaseQuery};
use super::requires::{convert_deps, parse_extra};
use super::select::{extract_first, matching_links, plan, Candidate};
use crate::config::Config;
use crate::version::USER_AGENT;
use pep508_rs::Requirement;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Connection timeout for index requests.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Overall timeout for index page requests.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A PEP 503 simple index with cached link listings and dependency lists.
#[derive(Clone)]
pub struct SimpleRepository {
    config: RepoConfig,
    http: Client,
    store: Arc<dyn CacheStore>,
    converters: Converters,
    cache_ttl: Duration,
    max_artifact_size: u64,
}

impl SimpleRepository {
    /// Create a repository over `store`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        config: RepoConfig,
        store: Arc<dyn CacheStore>,
        cache_ttl: Duration,
    ) -> Result<Self, RepoError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RepoError::registry(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            store,
            converters: Converters::default(),
            cache_ttl,
            max_artifact_size: MAX_ARTIFACT_SIZE,
        })
    }

    /// Create a repository from runtime config, caching on disk under
    /// [`Config::cache_root`].
    ///
    /// # Errors
    /// Returns an error if the index URL is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, RepoError> {
        let repo = RepoConfig::from_config(config)?;
        let store = Arc::new(FsCacheStore::new(config.cache_root()));
        Self::new(repo, store, config.cache_ttl())
    }

    /// Replace the artifact converters.
    #[must_use]
    pub fn with_converters(mut self, converters: Converters) -> Self {
        self.converters = converters;
        self
    }

    /// Cap the size of downloaded artifacts.
    #[must_use]
    pub fn with_max_artifact_size(mut self, max_bytes: u64) -> Self {
        self.max_artifact_size = max_bytes;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        self.config.url()
    }

    #[must_use]
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Location shown to users: the normalized index URL.
    #[must_use]
    pub fn pretty_url(&self) -> &str {
        self.config.url().as_str()
    }

    /// Dependencies of packages found here are resolved against this
    /// repository too.
    #[must_use]
    pub fn propagate(&self) -> bool {
        true
    }

    /// Fetch the index page for `name`, bypassing the cache.
    ///
    /// # Errors
    /// `PKG_NOT_FOUND` for an unknown package, `PKG_REGISTRY_ERROR` otherwise.
    pub async fn fetch_links(&self, name: &str) -> Result<Vec<LinkRecord>, RepoError> {
        links::fetch_links(&self.http, &self.config, name).await
    }

    /// Link listing for `name`, read through the link cache.
    ///
    /// # Errors
    /// Fails only when the cache misses and the live fetch fails.
    pub async fn links(&self, name: &str) -> Result<Vec<LinkRecord>, RepoError> {
        let cache: JsonCache<Vec<LinkRecord>> = JsonCache::new(
            Arc::clone(&self.store),
            CacheKey::links(self.config.host(), name),
            Some(self.cache_ttl),
        );

        if let Some(links) = cache.load() {
            debug!(package = %name, count = links.len(), "Link cache hit");
            return Ok(links);
        }

        let links = self.fetch_links(name).await?;
        cache.dump(&links);
        Ok(links)
    }

    /// Releases of the queried package, newest first.
    ///
    /// # Errors
    /// `PKG_NOT_FOUND` if the index has no page for the package.
    pub async fn get_releases(&self, query: &ReleaseQuery) -> Result<Vec<Release>, RepoError> {
        let links = self.links(&query.raw_name).await?;
        let releases = aggregate(&links, query, self.config.prereleases());
        debug!(
            package = %query.raw_name,
            releases = releases.len(),
            repo = %self.config.name(),
            "Resolved releases"
        );
        Ok(releases)
    }

    /// Declared requirements of `name` at `version` that apply to `extra`,
    /// read through the dependency cache.
    ///
    /// The cache holds the raw requirement strings, so one entry serves every
    /// extra. An empty list is a valid, cached answer: the release has no
    /// usable artifact or declares nothing.
    ///
    /// # Errors
    /// Fails if `extra` is not a valid name, the link listing cannot be
    /// fetched, or an artifact fails in a way other than being missing or
    /// unreadable.
    pub async fn get_dependencies(
        &self,
        name: &str,
        version: &str,
        extra: Option<&str>,
    ) -> Result<Vec<Requirement>, RepoError> {
        let extra = extra.map(parse_extra).transpose()?;
        let deps = self.raw_dependencies(name, version).await?;
        Ok(convert_deps(&deps, name, version, extra.as_ref()))
    }

    /// Requirement strings of `name` at `version`, read through the
    /// dependency cache.
    ///
    /// # Errors
    /// See [`Self::get_dependencies`].
    pub async fn raw_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<String>, RepoError> {
        let cache = TextCache::new(
            Arc::clone(&self.store),
            CacheKey::deps(self.config.host(), name, version),
            None,
        );

        if let Some(deps) = cache.load() {
            debug!(
                package = %name,
                version = %version,
                count = deps.len(),
                "Dependency cache hit"
            );
            return Ok(deps);
        }

        let deps = self.extract_dependencies(name, version).await?;
        cache.dump(&deps);
        Ok(deps)
    }

    /// Extract requirements from the best available artifact, bypassing the
    /// dependency cache.
    ///
    /// # Errors
    /// See [`Self::get_dependencies`].
    pub async fn extract_dependencies(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Vec<String>, RepoError> {
        let links = self.links(name).await?;
        let matched = matching_links(&links, name, version);
        let candidates = plan(&matched);

        if candidates.is_empty() {
            info!(package = %name, version = %version, "No usable artifact for release");
            return Ok(Vec::new());
        }

        extract_first(&candidates, |candidate| self.attempt(candidate)).await
    }

    /// Download one artifact and run its converter off the async runtime.
    async fn attempt(&self, candidate: Candidate<'_>) -> Result<Vec<String>, ExtractError> {
        let archive =
            download_artifact(&self.http, &candidate.link.url, self.max_artifact_size).await?;
        let converter = self.converters.get(candidate.kind);
        let filename = candidate.link.name.clone();

        tokio::task::spawn_blocking(move || converter.requirements(&filename, &archive))
            .await
            .map_err(|e| RepoError::extract_failed(format!("Converter task failed: {e}")))?
    }

    /// Search the index.
    ///
    /// # Errors
    /// Always `PKG_SEARCH_UNSUPPORTED`: the simple API has no search endpoint.
    pub fn search(&self, _query: &[&str]) -> Result<Vec<Release>, RepoError> {
        Err(RepoError::search_unsupported(self.config.name()))
    }
}

impl fmt::Debug for SimpleRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRepository")
            .field("name", &self.config.name())
            .field("url", &self.config.url().as_str())
            .field("store", &self.store)
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}
