//! Repository identity and index URL normalization.

use super::error::RepoError;
use crate::config::Config;
use url::Url;

pub use crate::config::INDEX_URL_ENV;

/// Hosts whose simple index always lives at `/simple/`.
const WAREHOUSE_HOSTS: [&str; 2] = ["pypi.org", "test.pypi.org"];

/// Legacy hostname that now serves from `pypi.org`.
const LEGACY_HOST: &str = "pypi.python.org";

/// Normalized, immutable description of one simple index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    name: String,
    url: Url,
    prereleases: bool,
}

impl RepoConfig {
    /// Build a repository description, normalizing name and URL once.
    ///
    /// - `pypi.org` / `pypi.python.org` as a name become `pypi`
    /// - host `pypi.python.org` becomes `pypi.org`
    /// - `pypi.org` and `test.pypi.org` always use the `/simple/` path
    /// - the path always ends with `/`, query and fragment are dropped
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed or has no host.
    pub fn new(name: &str, url: &str, prereleases: bool) -> Result<Self, RepoError> {
        let parsed = Url::parse(url)
            .map_err(|e| RepoError::config_invalid(format!("Invalid index URL '{url}': {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| RepoError::config_invalid(format!("Index URL '{url}' has no host")))?;

        let host = if host == LEGACY_HOST { "pypi.org" } else { host };
        let path = if WAREHOUSE_HOSTS.contains(&host) {
            "/simple/".to_string()
        } else if parsed.path().ends_with('/') {
            parsed.path().to_string()
        } else {
            format!("{}/", parsed.path())
        };

        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let normalized = format!("{}://{authority}{path}", parsed.scheme());
        let url = Url::parse(&normalized).map_err(|e| {
            RepoError::config_invalid(format!("Invalid normalized URL '{normalized}': {e}"))
        })?;

        let name = match name {
            "pypi.org" | LEGACY_HOST => "pypi",
            other => other,
        };

        Ok(Self {
            name: name.to_string(),
            url,
            prereleases,
        })
    }

    /// Build from the runtime config.
    ///
    /// # Errors
    /// Returns an error if the configured URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self, RepoError> {
        Self::new(&config.index_name, &config.index_url, config.prereleases)
    }

    /// Canonical repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized base URL of the simple index.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Hostname used to namespace cache entries.
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Whether prereleases are allowed for every query on this repository.
    #[must_use]
    pub fn prereleases(&self) -> bool {
        self.prereleases
    }

    /// Index page URL for a package: base URL + percent-encoded name + `/`.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot carry path segments.
    pub fn package_url(&self, package: &str) -> Result<Url, RepoError> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RepoError::config_invalid(format!("Index URL '{}' cannot be a base", self.url))
            })?
            .pop_if_empty()
            .push(package)
            .push("");
        Ok(url)
    }
}
