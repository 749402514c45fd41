//! Release aggregation from index links.

use super::filename::{canonicalize_name, parse_name};
use super::links::{LinkRecord, ANY_PYTHON};
use chrono::{DateTime, Utc};
use pep440_rs::Version;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What a caller wants releases for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseQuery {
    /// Package name as the user wrote it.
    pub raw_name: String,
    /// Extra being resolved for, if any.
    pub extra: Option<String>,
    /// Include prereleases for this query even if the repository does not.
    pub prereleases: bool,
}

impl ReleaseQuery {
    #[must_use]
    pub fn new(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            extra: None,
            prereleases: false,
        }
    }

    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    #[must_use]
    pub fn with_prereleases(mut self, prereleases: bool) -> Self {
        self.prereleases = prereleases;
        self
    }

    /// Canonical package name used for matching filenames.
    #[must_use]
    pub fn name(&self) -> String {
        canonicalize_name(&self.raw_name)
    }
}

/// Union of the interpreter constraints of a release's artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PythonConstraint {
    alternatives: Vec<String>,
}

impl PythonConstraint {
    #[must_use]
    pub fn new(alternatives: Vec<String>) -> Self {
        Self { alternatives }
    }

    /// Individual constraints, one per artifact that declared one.
    #[must_use]
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// True when at least one artifact runs on any interpreter.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.alternatives.is_empty() || self.alternatives.iter().any(|p| p == ANY_PYTHON)
    }
}

impl fmt::Display for PythonConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alternatives.is_empty() {
            return f.write_str(ANY_PYTHON);
        }
        f.write_str(&self.alternatives.join(" || "))
    }
}

/// One resolvable version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub display_name: String,
    pub version: Version,
    /// Upload time; the simple index carries none, so this is the Unix epoch.
    pub release_time: DateTime<Utc>,
    pub python: PythonConstraint,
    /// Content hashes of every artifact, in listing order.
    pub hashes: Vec<String>,
    pub extra: Option<String>,
}

impl Release {
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.version.any_prerelease()
    }
}

#[derive(Debug, Default)]
struct ReleaseInfo {
    hashes: Vec<String>,
    pythons: Vec<String>,
}

/// Build the release list for `query` out of an index listing.
///
/// Prereleases are dropped unless `include_prereleases` or the query asks for
/// them, except when the listing has nothing but prereleases. The result is
/// sorted by version, newest first.
#[must_use]
pub fn aggregate(
    links: &[LinkRecord],
    query: &ReleaseQuery,
    include_prereleases: bool,
) -> Vec<Release> {
    let target = query.name();

    // Grouped by PEP 440 equality, in first-seen order
    let mut infos: Vec<(Version, ReleaseInfo)> = Vec::new();

    for link in links {
        let (name, raw_version) = parse_name(&link.name);
        if canonicalize_name(&name) != target || raw_version.is_empty() {
            continue;
        }
        let version = match Version::from_str(&raw_version) {
            Ok(version) => version,
            Err(e) => {
                debug!(
                    package = %query.raw_name,
                    version = %raw_version,
                    error = %e,
                    "Skipping invalid version"
                );
                continue;
            }
        };

        let index = match infos.iter().position(|(seen, _)| *seen == version) {
            Some(index) => index,
            None => {
                infos.push((version, ReleaseInfo::default()));
                infos.len() - 1
            }
        };
        let info = &mut infos[index].1;
        if let Some(digest) = &link.digest {
            info.hashes.push(digest.clone());
        }
        if !link.python.is_empty() {
            info.pythons.push(link.python.clone());
        }
    }

    let allow_prereleases = include_prereleases || query.prereleases;
    let mut releases = Vec::new();
    let mut prereleases = Vec::new();
    let mut found_stable = false;

    for (version, info) in infos {
        let release = Release {
            display_name: query.raw_name.clone(),
            version,
            release_time: DateTime::<Utc>::UNIX_EPOCH,
            python: PythonConstraint::new(info.pythons),
            hashes: info.hashes,
            extra: query.extra.clone(),
        };

        if release.is_prerelease() {
            prereleases.push(release.clone());
            if !allow_prereleases {
                continue;
            }
        } else {
            found_stable = true;
        }

        releases.push(release);
    }

    // Only prereleases published: allow them rather than report nothing
    if !found_stable && !prereleases.is_empty() {
        releases = prereleases;
    }

    releases.sort_by(|a, b| b.version.cmp(&a.version));
    releases
}
